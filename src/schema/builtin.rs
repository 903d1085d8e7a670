//! Built-in demonstration schema.
//!
//! Three related tables:
//! - `products` - Catalog of ten items with prices
//! - `customers` - Five customers, unique by email
//! - `orders` - References one customer and one product, with quantity and date

/// Table names in creation order.
pub const DEMO_TABLES: [&str; 3] = ["products", "customers", "orders"];

/// `products` table.
pub const PRODUCTS_DDL: &str = "CREATE TABLE IF NOT EXISTS products (
    product_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    price DECIMAL(10, 2) NOT NULL
)";

/// `customers` table.
pub const CUSTOMERS_DDL: &str = "CREATE TABLE IF NOT EXISTS customers (
    customer_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
)";

/// `orders` table.
///
/// Foreign keys are declared but SQLite only enforces them when
/// `PRAGMA foreign_keys` is on, which this crate never sets.
pub const ORDERS_DDL: &str = "CREATE TABLE IF NOT EXISTS orders (
    order_id INTEGER PRIMARY KEY,
    customer_id INTEGER,
    product_id INTEGER,
    quantity INTEGER NOT NULL,
    order_date DATE NOT NULL,
    FOREIGN KEY (customer_id) REFERENCES customers (customer_id),
    FOREIGN KEY (product_id) REFERENCES products (product_id)
)";

/// Fixed product catalog: (name, price).
pub const PRODUCTS: [(&str, f64); 10] = [
    ("Laptop", 999.99),
    ("Smartphone", 599.99),
    ("Headphones", 149.99),
    ("Tablet", 399.99),
    ("Smartwatch", 249.99),
    ("Camera", 799.99),
    ("Gaming Console", 499.99),
    ("Bluetooth Speaker", 79.99),
    ("Fitness Tracker", 129.99),
    ("External Hard Drive", 89.99),
];

/// Fixed customer list: (name, email).
pub const CUSTOMERS: [(&str, &str); 5] = [
    ("John Doe", "john@example.com"),
    ("Jane Smith", "jane@example.com"),
    ("Bob Johnson", "bob@example.com"),
    ("Alice Brown", "alice@example.com"),
    ("Charlie Davis", "charlie@example.com"),
];

/// All DDL statements in dependency order.
pub fn demo_schema() -> [&'static str; 3] {
    [PRODUCTS_DDL, CUSTOMERS_DDL, ORDERS_DDL]
}
