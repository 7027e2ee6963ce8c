// Phase 11: Catalog content source (store names, item catalogs, prices)

use rand::Rng;
use rand::seq::IndexedRandom;

use super::{ContentSource, LineItem, Money, ReceiptContent};
use crate::seed::ReceiptRng;
use crate::style::store::{StoreType, store_template};

/// Catalog entry: name, category, price range in minor units.
#[derive(Debug, Clone, Copy)]
pub struct CatalogItem {
    pub name: &'static str,
    pub category: &'static str,
    pub min_price: i64,
    pub max_price: i64,
}

const fn item(name: &'static str, category: &'static str, min_price: i64, max_price: i64) -> CatalogItem {
    CatalogItem {
        name,
        category,
        min_price,
        max_price,
    }
}

const GROCERY_ITEMS: &[CatalogItem] = &[
    item("Milk 1 Gallon", "Dairy", 399, 599),
    item("Eggs Dozen", "Dairy", 299, 499),
    item("Bread Whole Wheat", "Bakery", 249, 399),
    item("Chicken Breast", "Meat", 699, 1299),
    item("Ground Beef", "Meat", 599, 999),
    item("Bananas", "Produce", 59, 89),
    item("Apples", "Produce", 149, 299),
    item("Tomatoes", "Produce", 299, 499),
    item("Potatoes 5lb", "Produce", 399, 599),
    item("Orange Juice", "Beverages", 399, 599),
    item("Coffee", "Beverages", 799, 1499),
    item("Pasta", "Pantry", 199, 349),
    item("Rice 2lb", "Pantry", 499, 799),
    item("Cereal", "Pantry", 399, 599),
    item("Yogurt", "Dairy", 99, 199),
    item("Cheese", "Dairy", 499, 899),
    item("Ice Cream", "Frozen", 399, 699),
    item("Frozen Pizza", "Frozen", 599, 999),
    item("Chips", "Snacks", 299, 499),
    item("Cookies", "Snacks", 349, 549),
];

const RESTAURANT_ITEMS: &[CatalogItem] = &[
    item("Caesar Salad", "Starters", 899, 1299),
    item("French Onion Soup", "Starters", 699, 999),
    item("Chicken Wings", "Starters", 1099, 1499),
    item("Grilled Salmon", "Main", 1899, 2699),
    item("Ribeye Steak", "Main", 2499, 3499),
    item("Chicken Parmesan", "Main", 1599, 1999),
    item("Pasta Carbonara", "Main", 1499, 1899),
    item("Burger & Fries", "Main", 1299, 1699),
    item("Fish & Chips", "Main", 1399, 1799),
    item("Vegetable Stir Fry", "Main", 1199, 1499),
    item("Chocolate Cake", "Dessert", 699, 899),
    item("Cheesecake", "Dessert", 799, 999),
    item("Ice Cream Sundae", "Dessert", 599, 799),
    item("Soft Drink", "Beverages", 299, 399),
    item("Coffee", "Beverages", 299, 499),
    item("Wine Glass", "Beverages", 799, 1299),
    item("Beer", "Beverages", 499, 699),
];

const RETAIL_ITEMS: &[CatalogItem] = &[
    item("T-Shirt", "Clothing", 1499, 2999),
    item("Jeans", "Clothing", 3999, 7999),
    item("Sweater", "Clothing", 2999, 5999),
    item("Dress", "Clothing", 4999, 9999),
    item("Sneakers", "Footwear", 5999, 12999),
    item("Boots", "Footwear", 7999, 14999),
    item("Sandals", "Footwear", 2499, 4999),
    item("Backpack", "Accessories", 2999, 6999),
    item("Wallet", "Accessories", 1999, 4999),
    item("Belt", "Accessories", 2499, 4499),
    item("Watch", "Accessories", 4999, 19999),
    item("Sunglasses", "Accessories", 2999, 8999),
    item("Scarf", "Accessories", 1499, 3499),
    item("Hat", "Accessories", 1999, 3999),
    item("Jacket", "Outerwear", 6999, 14999),
    item("Coat", "Outerwear", 9999, 24999),
];

const GROCERY_NAMES: &[&str] = &[
    "FreshMart",
    "SuperSave",
    "Green Grocer",
    "QuickStop Market",
    "Valley Foods",
    "City Market",
    "Food Palace",
    "MegaMart",
];

const RESTAURANT_NAMES: &[&str] = &[
    "The Golden Fork",
    "Bella Vista",
    "Harbor Grill",
    "The Cozy Kitchen",
    "Urban Eats",
    "Sunset Bistro",
    "The Garden Table",
    "Blue Moon Cafe",
];

const RETAIL_NAMES: &[&str] = &[
    "Fashion Forward",
    "Style House",
    "Trendy Threads",
    "Urban Outfitters",
    "The Clothing Co.",
    "Fashion Plaza",
    "Style Central",
    "Wardrobe World",
];

const STREETS: &[&str] = &[
    "Main St",
    "Oak Ave",
    "Maple Dr",
    "Cedar Ln",
    "Park Blvd",
    "Elm St",
    "Lakeview Rd",
    "Washington Ave",
    "Hillcrest Dr",
    "River Rd",
];

const CITIES: &[(&str, &str)] = &[
    ("Springfield", "IL"),
    ("Riverside", "CA"),
    ("Franklin", "TN"),
    ("Greenville", "SC"),
    ("Madison", "WI"),
    ("Salem", "OR"),
    ("Fairview", "TX"),
    ("Georgetown", "KY"),
    ("Clinton", "NY"),
    ("Arlington", "VA"),
];

const PAYMENT_METHODS: &[&str] = &["VISA", "MASTERCARD", "CASH", "DEBIT"];

const HEX_DIGITS: &[u8] = b"0123456789ABCDEF";

/// Built-in content source backed by static per-store catalogs.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub currency_symbol: String,
    /// Tax rate range in basis points (500 = 5 %).
    pub tax_rate_bp: (u32, u32),
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            tax_rate_bp: (500, 1000),
        }
    }
}

impl CatalogSource {
    pub fn items_for(store_type: StoreType) -> &'static [CatalogItem] {
        match store_type {
            StoreType::Grocery => GROCERY_ITEMS,
            StoreType::Restaurant => RESTAURANT_ITEMS,
            StoreType::Retail => RETAIL_ITEMS,
        }
    }

    pub fn names_for(store_type: StoreType) -> &'static [&'static str] {
        match store_type {
            StoreType::Grocery => GROCERY_NAMES,
            StoreType::Restaurant => RESTAURANT_NAMES,
            StoreType::Retail => RETAIL_NAMES,
        }
    }

    fn address(rng: &mut ReceiptRng) -> (Vec<String>, String) {
        let number: u32 = rng.random_range(100..=9999);
        let street = STREETS.choose(rng).copied().unwrap_or("Main St");
        let (city, state) = CITIES.choose(rng).copied().unwrap_or(("Springfield", "IL"));
        let zip: u32 = rng.random_range(10000..=99999);
        let phone = format!(
            "(555) {:03}-{:04}",
            rng.random_range(200..=999u32),
            rng.random_range(0..=9999u32)
        );
        (
            vec![
                format!("{number} {street}"),
                format!("{city}, {state} {zip}"),
            ],
            phone,
        )
    }

    fn timestamp(rng: &mut ReceiptRng) -> (String, String) {
        let year: u32 = rng.random_range(2023..=2025);
        let month: u32 = rng.random_range(1..=12);
        // 全ての月で有効な日付に限定する
        let day: u32 = rng.random_range(1..=28);
        let hour: u32 = rng.random_range(8..=22);
        let minute: u32 = rng.random_range(0..=59);
        let second: u32 = rng.random_range(0..=59);

        let (hour12, meridiem) = match hour {
            0 => (12, "AM"),
            1..=11 => (hour, "AM"),
            12 => (12, "PM"),
            _ => (hour - 12, "PM"),
        };
        (
            format!("{month:02}/{day:02}/{year}"),
            format!("{hour12:02}:{minute:02}:{second:02} {meridiem}"),
        )
    }

    fn transaction_id(rng: &mut ReceiptRng) -> String {
        (0..12)
            .map(|_| HEX_DIGITS[rng.random_range(0..HEX_DIGITS.len())] as char)
            .collect()
    }
}

impl ContentSource for CatalogSource {
    fn generate(
        &self,
        store_type: StoreType,
        rng: &mut ReceiptRng,
    ) -> crate::error::Result<ReceiptContent> {
        let template = store_template(store_type);
        let store_name = Self::names_for(store_type)
            .choose(rng)
            .copied()
            .unwrap_or("Store")
            .to_string();
        let (address_lines, phone) = Self::address(rng);

        let catalog = Self::items_for(store_type);
        let (min_items, max_items) = template.item_count;
        let count = rng.random_range(min_items..=max_items).min(catalog.len());

        let picked: Vec<CatalogItem> = catalog.choose_multiple(rng, count).copied().collect();
        let items: Vec<LineItem> = picked
            .into_iter()
            .map(|entry| {
                let quantity = if template.single_quantity {
                    1
                } else {
                    rng.random_range(1..=3u32)
                };
                let unit = Money::from_minor(rng.random_range(entry.min_price..=entry.max_price));
                LineItem {
                    name: entry.name.to_string(),
                    category: entry.category.to_string(),
                    quantity,
                    unit_price: unit,
                    total: Money::from_minor(unit.minor() * quantity as i64),
                }
            })
            .collect();

        let subtotal: Money = items.iter().map(|i| i.total).sum();
        let (lo, hi) = self.tax_rate_bp;
        let rate_bp = rng.random_range(lo..=hi) as i64;
        // 端数は四捨五入 (half-up)
        let tax = Money::from_minor((subtotal.minor() * rate_bp + 5_000) / 10_000);
        let total = subtotal + tax;

        let (date, time) = Self::timestamp(rng);
        let transaction_id = Self::transaction_id(rng);
        let payment_method = PAYMENT_METHODS
            .choose(rng)
            .copied()
            .unwrap_or("CASH")
            .to_string();

        let content = ReceiptContent {
            store_name,
            address_lines,
            phone,
            date,
            time,
            transaction_id,
            payment_method,
            items,
            subtotal,
            tax,
            total,
            currency_symbol: self.currency_symbol.clone(),
        };
        content.validate()?;
        Ok(content)
    }
}
