//! Best-selling products

use super::types::{round_to, Category};
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

const PRODUCTS: [&str; 10] = [
    "Wireless Headphones",
    "Smart Watch",
    "Laptop Stand",
    "Mechanical Keyboard",
    "USB-C Hub",
    "Monitor Light Bar",
    "Ergonomic Mouse",
    "Webcam HD",
    "Portable SSD",
    "Phone Charger",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub revenue: f64,
    pub units_sold: u32,
    /// Period-over-period growth in percent
    pub growth: f64,
}

/// `count` products sorted descending by revenue
pub fn generate_top_products(rng: &mut dyn RandomSource, count: usize) -> Vec<TopProduct> {
    let mut products: Vec<TopProduct> = (0..count)
        .map(|i| TopProduct {
            id: format!("prd-{:03}", i + 1),
            name: PRODUCTS[rng.index(PRODUCTS.len())].to_string(),
            category: Category::ALL[rng.index(Category::ALL.len())],
            revenue: round_to(rng.uniform(5_000.0, 50_000.0), 2),
            units_sold: rng.int_inclusive(50, 500) as u32,
            growth: round_to(rng.uniform(-10.0, 30.0), 2),
        })
        .collect();

    products.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    log::debug!("Generated {} top product(s)", products.len());
    products
}
