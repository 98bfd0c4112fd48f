pub mod shop;

pub use shop::FlowerShop;
