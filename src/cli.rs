//! Command-line surface over the FlowerShop facade.
//!
//! Deliberately non-interactive: every operator decision the old menu
//! workflow would prompt for arrives as an argument, and `orders create`
//! replays the add-item decisions one call at a time against the builder.

use bigdecimal::BigDecimal;
use clap::{Parser, Subcommand};

use crate::domain::{NewCustomer, NewFlower, OrderStatus};
use crate::services::FlowerShop;
use crate::use_cases::AddItemRequest;

#[derive(Parser)]
#[command(name = "bloomstock")]
#[command(about = "Bloomstock - flower shop stock and order management", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flower catalog commands
    #[command(subcommand)]
    Flowers(FlowerCommands),

    /// Customer commands
    #[command(subcommand)]
    Customers(CustomerCommands),

    /// Order commands
    #[command(subcommand)]
    Orders(OrderCommands),

    /// Sales reports
    #[command(subcommand)]
    Reports(ReportCommands),

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),
}

#[derive(Subcommand)]
pub enum FlowerCommands {
    /// List the catalog (in-stock flowers only unless --all)
    List {
        #[arg(long)]
        all: bool,
    },

    /// Add a flower to the catalog
    Add {
        name: String,

        /// Price per unit, e.g. 2.50
        price: BigDecimal,

        /// Initial quantity on hand
        quantity: i64,

        /// Category (e.g. Roses, Tulips)
        category: String,

        /// Low stock threshold
        #[arg(long, default_value_t = 10)]
        threshold: i64,
    },

    /// List flowers below their low-stock threshold
    LowStock,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// List all customers
    List,

    /// Add a customer
    Add {
        name: String,
        phone: String,
        email: String,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// List all orders, newest first
    List,

    /// Show one order with its items
    Show {
        order_id: i64,

        /// Print the order as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build and commit an order
    Create {
        /// Customer id
        #[arg(long)]
        customer: i64,

        /// Line item as FLOWER_ID:QTY; repeat for multiple items
        #[arg(long = "item", value_name = "FLOWER_ID:QTY", required = true)]
        items: Vec<String>,

        /// Status to finish with (pending or completed)
        #[arg(long, default_value = "completed")]
        status: OrderStatus,
    },

    /// Change an order's status
    SetStatus {
        order_id: i64,
        status: OrderStatus,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Completed sales totals
    Sales,

    /// Top-selling flowers
    TopFlowers {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

fn currency(amount: &BigDecimal) -> String {
    format!("${}", amount.with_scale(2))
}

fn parse_item(raw: &str) -> anyhow::Result<AddItemRequest> {
    let (flower, qty) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("expected FLOWER_ID:QTY, got '{raw}'"))?;
    Ok(AddItemRequest {
        flower_id: flower.trim().parse()?,
        quantity: qty.trim().parse()?,
    })
}

pub async fn handle_flowers(shop: &FlowerShop, command: FlowerCommands) -> anyhow::Result<()> {
    match command {
        FlowerCommands::List { all } => {
            let flowers = if all {
                shop.list_flowers().await?
            } else {
                shop.list_available_flowers().await?
            };
            if flowers.is_empty() {
                println!("No flowers in inventory");
                return Ok(());
            }
            println!(
                "{:<6} {:<24} {:>10} {:>6}  {:<16} {}",
                "ID", "Name", "Price", "Qty", "Category", "Status"
            );
            for flower in flowers {
                println!(
                    "{:<6} {:<24} {:>10} {:>6}  {:<16} {}",
                    flower.id,
                    flower.name,
                    currency(&flower.price),
                    flower.quantity,
                    flower.category,
                    if flower.is_low_stock() { "LOW" } else { "ok" }
                );
            }
            Ok(())
        }
        FlowerCommands::Add {
            name,
            price,
            quantity,
            category,
            threshold,
        } => {
            let flower = shop
                .add_flower(NewFlower {
                    name,
                    price,
                    quantity,
                    category,
                    low_stock_threshold: threshold,
                })
                .await?;
            println!("✓ Added {} (id {})", flower.name, flower.id);
            Ok(())
        }
        FlowerCommands::LowStock => {
            let flowers = shop.list_low_stock().await?;
            if flowers.is_empty() {
                println!("All items are well stocked");
                return Ok(());
            }
            println!("{:<6} {:<24} {:>8} {:>10}", "ID", "Name", "Qty", "Threshold");
            for flower in flowers {
                println!(
                    "{:<6} {:<24} {:>8} {:>10}",
                    flower.id, flower.name, flower.quantity, flower.low_stock_threshold
                );
            }
            Ok(())
        }
    }
}

pub async fn handle_customers(shop: &FlowerShop, command: CustomerCommands) -> anyhow::Result<()> {
    match command {
        CustomerCommands::List => {
            let customers = shop.list_customers().await?;
            if customers.is_empty() {
                println!("No customers found");
                return Ok(());
            }
            println!("{:<6} {:<24} {:<16} {}", "ID", "Name", "Phone", "Email");
            for customer in customers {
                println!(
                    "{:<6} {:<24} {:<16} {}",
                    customer.id, customer.name, customer.phone, customer.email
                );
            }
            Ok(())
        }
        CustomerCommands::Add { name, phone, email } => {
            let customer = shop.add_customer(NewCustomer { name, phone, email }).await?;
            println!("✓ Added customer {} (id {})", customer.name, customer.id);
            Ok(())
        }
    }
}

pub async fn handle_orders(shop: &FlowerShop, command: OrderCommands) -> anyhow::Result<()> {
    match command {
        OrderCommands::List => {
            let orders = shop.list_orders().await?;
            if orders.is_empty() {
                println!("No orders found");
                return Ok(());
            }
            println!(
                "{:<6} {:<10} {:<12} {:>10}  {}",
                "ID", "Customer", "Date", "Total", "Status"
            );
            for order in orders {
                println!(
                    "{:<6} {:<10} {:<12} {:>10}  {}",
                    order.id,
                    order.customer_id,
                    order.created_at.format("%Y-%m-%d"),
                    currency(&order.total),
                    order.status
                );
            }
            Ok(())
        }
        OrderCommands::Show { order_id, json } => {
            let order = shop.get_order(order_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&order)?);
                return Ok(());
            }
            println!("Order #{}", order.id);
            println!("  Customer: {}", order.customer_id);
            println!("  Date:     {}", order.created_at.format("%Y-%m-%d %H:%M"));
            println!("  Status:   {}", order.status);
            println!("  Total:    {}", currency(&order.total));
            println!("  Items:");
            for item in &order.items {
                println!("    flower {} x {}", item.flower_id, item.quantity);
            }
            Ok(())
        }
        OrderCommands::Create {
            customer,
            items,
            status,
        } => {
            let mut builder = shop.create_order(customer).await?;
            for raw in &items {
                let request = parse_item(raw)?;
                builder.add_item(request).await?;
            }
            let order = builder.finish(status).await?;
            println!(
                "✓ Order #{} created: {} ({})",
                order.id,
                currency(&order.total),
                order.status
            );
            Ok(())
        }
        OrderCommands::SetStatus { order_id, status } => {
            let order = shop.change_order_status(order_id, status).await?;
            println!("✓ Order #{} is now {}", order.id, order.status);
            Ok(())
        }
    }
}

pub async fn handle_reports(shop: &FlowerShop, command: ReportCommands) -> anyhow::Result<()> {
    match command {
        ReportCommands::Sales => {
            let summary = shop.sales_summary().await?;
            println!("Total Sales:           {}", currency(&summary.total_sales));
            println!("Recent Sales (7 days): {}", currency(&summary.recent_sales));
            println!("Completed Orders:      {}", summary.completed_orders);
            Ok(())
        }
        ReportCommands::TopFlowers { limit } => {
            let rows = shop.top_flowers(limit).await?;
            if rows.is_empty() {
                println!("No sales data available");
                return Ok(());
            }
            println!("{:<6} {:<24} {:>10} {:>12}", "Rank", "Flower", "Units", "Revenue");
            for (rank, row) in rows.iter().enumerate() {
                println!(
                    "{:<6} {:<24} {:>10} {:>12}",
                    rank + 1,
                    row.name,
                    row.units_sold,
                    currency(&row.revenue)
                );
            }
            Ok(())
        }
    }
}
