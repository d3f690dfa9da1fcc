//! In-process session carts
//!
//! Carts are per browser session, keyed by an opaque session id the
//! client generates when it scans a table's QR code. They live only in
//! memory: a cart is scratch state and becomes durable the moment it is
//! submitted as an order. Totals are recomputed from the lines on every
//! read, never stored.

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How long an untouched session survives before the sweeper drops it
pub const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// One line in a cart. `price` is the menu price captured when the line
/// was added; it rides along into `price_at_time` at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub menu_item_id: Uuid,
    pub item_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub restaurant_id: Uuid,
    pub table_id: Uuid,
    pub lines: Vec<CartLine>,
}

/// Cart plus derived totals, as returned to the client
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub cart: Cart,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug)]
struct Entry {
    cart: Cart,
    touched: Instant,
}

#[derive(Debug, Default)]
pub struct CartStore {
    carts: DashMap<String, Entry>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line, merging into an existing line when the same item with
    /// the same instructions is already present. A session is bound to
    /// the restaurant and table of its first line; returns `false`
    /// (nothing added) when a later line names a different one.
    pub fn add_line(
        &self,
        session_id: &str,
        restaurant_id: Uuid,
        table_id: Uuid,
        line: CartLine,
    ) -> bool {
        let mut entry = self
            .carts
            .entry(session_id.to_string())
            .or_insert_with(|| Entry {
                cart: Cart {
                    restaurant_id,
                    table_id,
                    lines: Vec::new(),
                },
                touched: Instant::now(),
            });
        if entry.cart.restaurant_id != restaurant_id || entry.cart.table_id != table_id {
            return false;
        }
        entry.touched = Instant::now();
        match entry.cart.lines.iter_mut().find(|l| {
            l.menu_item_id == line.menu_item_id
                && l.special_instructions == line.special_instructions
        }) {
            Some(existing) => existing.quantity += line.quantity,
            None => entry.cart.lines.push(line),
        }
        true
    }

    /// Set a line's quantity; zero removes the line. Returns `false`
    /// when the session or line does not exist.
    pub fn set_quantity(&self, session_id: &str, menu_item_id: Uuid, quantity: i32) -> bool {
        let Some(mut entry) = self.carts.get_mut(session_id) else {
            return false;
        };
        entry.touched = Instant::now();
        if quantity <= 0 {
            let before = entry.cart.lines.len();
            entry.cart.lines.retain(|l| l.menu_item_id != menu_item_id);
            return entry.cart.lines.len() < before;
        }
        match entry
            .cart
            .lines
            .iter_mut()
            .find(|l| l.menu_item_id == menu_item_id)
        {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove_line(&self, session_id: &str, menu_item_id: Uuid) -> bool {
        self.set_quantity(session_id, menu_item_id, 0)
    }

    pub fn clear(&self, session_id: &str) {
        self.carts.remove(session_id);
    }

    /// Snapshot a cart with totals at the given tax rate
    pub fn view(&self, session_id: &str, tax_rate: Decimal) -> Option<CartView> {
        let cart = self.carts.get(session_id)?.cart.clone();
        let (subtotal, tax, total) = totals(&cart.lines, tax_rate);
        Some(CartView {
            cart,
            subtotal,
            tax,
            total,
        })
    }

    /// Drop sessions idle for longer than `ttl`. Abandoned carts are the
    /// common case (diner scans, browses, walks away), so this runs
    /// periodically from a background task. Returns the eviction count.
    pub fn sweep(&self, ttl: Duration) -> usize {
        let before = self.carts.len();
        self.carts.retain(|_, entry| entry.touched.elapsed() <= ttl);
        before.saturating_sub(self.carts.len())
    }
}

/// Compute (subtotal, tax, total) from cart lines.
///
/// Tax is rounded to cents once, over the whole subtotal rather than
/// per line, and the total is derived from the rounded figures so
/// `total = subtotal + tax` holds exactly.
pub fn totals(lines: &[CartLine], tax_rate: Decimal) -> (Decimal, Decimal, Decimal) {
    let subtotal: Decimal = lines
        .iter()
        .map(|l| l.price * Decimal::from(l.quantity))
        .sum();
    let tax = (subtotal * tax_rate).round_dp(2);
    (subtotal, tax, subtotal + tax)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, price: &str, quantity: i32) -> CartLine {
        CartLine {
            menu_item_id: Uuid::new_v4(),
            item_name: name.to_string(),
            price: price.parse().unwrap(),
            quantity,
            special_instructions: None,
        }
    }

    fn ten_percent() -> Decimal {
        Decimal::new(10, 2)
    }

    #[test]
    fn test_totals_two_burgers() {
        let lines = vec![line("Burger", "12.99", 2)];
        let (subtotal, tax, total) = totals(&lines, ten_percent());
        assert_eq!(subtotal, "25.98".parse::<Decimal>().unwrap());
        assert_eq!(tax, "2.60".parse::<Decimal>().unwrap());
        assert_eq!(total, "28.58".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_totals_empty_cart() {
        let (subtotal, tax, total) = totals(&[], ten_percent());
        assert_eq!(subtotal, Decimal::ZERO);
        assert_eq!(tax, Decimal::ZERO);
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_total_is_subtotal_plus_tax() {
        let lines = vec![line("Soup", "3.33", 3), line("Pie", "7.77", 1)];
        let (subtotal, tax, total) = totals(&lines, ten_percent());
        assert_eq!(total, subtotal + tax);
    }

    #[test]
    fn test_add_merges_same_item() {
        let store = CartStore::new();
        let restaurant = Uuid::new_v4();
        let table = Uuid::new_v4();
        let l = line("Burger", "12.99", 1);
        let item_id = l.menu_item_id;
        store.add_line("s1", restaurant, table, l.clone());
        store.add_line("s1", restaurant, table, l);
        let view = store.view("s1", ten_percent()).unwrap();
        assert_eq!(view.cart.lines.len(), 1);
        assert_eq!(view.cart.lines[0].quantity, 2);
        assert_eq!(view.cart.lines[0].menu_item_id, item_id);
    }

    #[test]
    fn test_distinct_instructions_keep_separate_lines() {
        let store = CartStore::new();
        let restaurant = Uuid::new_v4();
        let table = Uuid::new_v4();
        let plain = line("Burger", "12.99", 1);
        let mut no_onions = plain.clone();
        no_onions.special_instructions = Some("no onions".to_string());
        store.add_line("s1", restaurant, table, plain);
        store.add_line("s1", restaurant, table, no_onions);
        let view = store.view("s1", ten_percent()).unwrap();
        assert_eq!(view.cart.lines.len(), 2);
    }

    #[test]
    fn test_add_rejects_cross_restaurant_line() {
        let store = CartStore::new();
        let restaurant_a = Uuid::new_v4();
        let table_a = Uuid::new_v4();
        assert!(store.add_line("s1", restaurant_a, table_a, line("Burger", "12.99", 1)));
        assert!(!store.add_line(
            "s1",
            Uuid::new_v4(),
            Uuid::new_v4(),
            line("Sushi", "9.99", 1)
        ));
        let view = store.view("s1", ten_percent()).unwrap();
        assert_eq!(view.cart.restaurant_id, restaurant_a);
        assert_eq!(view.cart.lines.len(), 1);
        assert_eq!(view.cart.lines[0].item_name, "Burger");
    }

    #[test]
    fn test_add_rejects_table_switch() {
        let store = CartStore::new();
        let restaurant = Uuid::new_v4();
        assert!(store.add_line("s1", restaurant, Uuid::new_v4(), line("Burger", "12.99", 1)));
        assert!(!store.add_line("s1", restaurant, Uuid::new_v4(), line("Fries", "4.50", 1)));
        assert_eq!(store.view("s1", ten_percent()).unwrap().cart.lines.len(), 1);
    }

    #[test]
    fn test_sweep_evicts_idle_sessions() {
        let store = CartStore::new();
        store.add_line("stale", Uuid::new_v4(), Uuid::new_v4(), line("Burger", "12.99", 1));
        store.add_line("fresh", Uuid::new_v4(), Uuid::new_v4(), line("Pizza", "15.50", 1));
        let past = Instant::now()
            .checked_sub(Duration::from_secs(60))
            .unwrap();
        store.carts.get_mut("stale").unwrap().touched = past;

        assert_eq!(store.sweep(Duration::from_secs(30)), 1);
        assert!(store.view("stale", ten_percent()).is_none());
        assert!(store.view("fresh", ten_percent()).is_some());
    }

    #[test]
    fn test_sweep_keeps_everything_within_ttl() {
        let store = CartStore::new();
        store.add_line("s1", Uuid::new_v4(), Uuid::new_v4(), line("Burger", "12.99", 1));
        assert_eq!(store.sweep(SESSION_TTL), 0);
        assert!(store.view("s1", ten_percent()).is_some());
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let store = CartStore::new();
        let l = line("Burger", "12.99", 2);
        let item_id = l.menu_item_id;
        store.add_line("s1", Uuid::new_v4(), Uuid::new_v4(), l);
        assert!(store.set_quantity("s1", item_id, 0));
        let view = store.view("s1", ten_percent()).unwrap();
        assert!(view.cart.lines.is_empty());
        assert_eq!(view.total, Decimal::ZERO);
    }

    #[test]
    fn test_set_quantity_unknown_line() {
        let store = CartStore::new();
        store.add_line("s1", Uuid::new_v4(), Uuid::new_v4(), line("Burger", "12.99", 1));
        assert!(!store.set_quantity("s1", Uuid::new_v4(), 3));
        assert!(!store.set_quantity("missing", Uuid::new_v4(), 3));
    }

    #[test]
    fn test_clear_drops_session() {
        let store = CartStore::new();
        store.add_line("s1", Uuid::new_v4(), Uuid::new_v4(), line("Burger", "12.99", 1));
        store.clear("s1");
        assert!(store.view("s1", ten_percent()).is_none());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = CartStore::new();
        store.add_line("s1", Uuid::new_v4(), Uuid::new_v4(), line("Burger", "12.99", 1));
        store.add_line("s2", Uuid::new_v4(), Uuid::new_v4(), line("Pizza", "15.50", 2));
        assert_eq!(store.view("s1", ten_percent()).unwrap().cart.lines.len(), 1);
        assert_eq!(
            store.view("s2", ten_percent()).unwrap().cart.lines[0].item_name,
            "Pizza"
        );
    }
}
