//! Client-side shopping cart.
//!
//! Lines are keyed by product id; adding a product that is already in the
//! cart grows the existing line instead of appending a duplicate.

use rust_decimal::Decimal;

use super::money;
use super::order::{OrderDraft, OrderItem};
use super::product::Product;

/// Contact and delivery details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<OrderItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` kilograms of a product. Non-positive quantities are
    /// ignored, as are additions that would push a line past the largest
    /// storable amount.
    pub fn add_item(&mut self, product: &Product, quantity: i32) {
        if quantity <= 0 {
            return;
        }

        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(line) => {
                let Some(merged) = line.quantity.checked_add(quantity) else {
                    return;
                };
                if let Some(total) = priced(line.price, merged) {
                    line.quantity = merged;
                    line.total = total;
                }
            }
            None => {
                let price = money::normalize(product.price);
                if let Some(total) = priced(price, quantity) {
                    self.items.push(OrderItem {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        price,
                        quantity,
                        total,
                        image_url: product.image_url.clone(),
                    });
                }
            }
        }
    }

    pub fn remove_item(&mut self, product_id: i32) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Set the quantity of a line; zero or less removes it. A quantity whose
    /// total is not storable leaves the line unchanged.
    pub fn update_quantity(&mut self, product_id: i32, quantity: i32) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }

        if let Some(line) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            if let Some(total) = priced(line.price, quantity) {
                line.quantity = quantity;
                line.total = total;
            }
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_amount(&self) -> Decimal {
        money::normalize(self.items.iter().map(|i| i.total).sum())
    }

    /// Turn the cart into an order payload ready to submit.
    pub fn checkout(self, customer: CustomerDetails) -> OrderDraft {
        let total_amount = self.total_amount();
        OrderDraft {
            customer_name: customer.name,
            customer_email: customer.email,
            customer_phone: customer.phone,
            delivery_address: customer.address,
            delivery_city: customer.city,
            delivery_pincode: customer.pincode,
            total_amount,
            items: self.items,
        }
    }
}

fn priced(price: Decimal, quantity: i32) -> Option<Decimal> {
    money::line_total(price, quantity).filter(money::in_range)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use validator::Validate;

    use super::*;

    fn product(id: i32, price: &str) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            description: None,
            price: Decimal::from_str(price).unwrap(),
            image_url: None,
        }
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            address: "12 Market Road".to_string(),
            city: "Pune".to_string(),
            pincode: "411001".to_string(),
        }
    }

    #[test]
    fn test_adding_same_product_merges_lines() {
        let tomatoes = product(1, "45");
        let mut cart = Cart::new();
        cart.add_item(&tomatoes, 2);
        cart.add_item(&tomatoes, 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.items()[0].total, Decimal::from_str("225.00").unwrap());
    }

    #[test]
    fn test_update_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "45"), 2);
        cart.add_item(&product(2, "25.50"), 1);

        cart.update_quantity(2, 4);
        assert_eq!(cart.items()[1].total, Decimal::from_str("102.00").unwrap());

        cart.update_quantity(1, 0);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id, 2);

        cart.remove_item(2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_non_positive_add_is_ignored() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "45"), 0);
        cart.add_item(&product(1, "45"), -2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_checkout_produces_consistent_draft() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "45"), 2);
        cart.add_item(&product(3, "30"), 1);
        assert_eq!(cart.total_amount(), Decimal::from_str("120.00").unwrap());

        let draft = cart.checkout(customer());
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.total_amount, Decimal::from_str("120.00").unwrap());
        assert!(draft.validate().is_ok());
        assert!(draft.check_totals().is_ok());
    }

    #[test]
    fn test_unstorable_lines_are_refused() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "50000000000000000000000000000"), 2);
        assert!(cart.is_empty());

        cart.add_item(&product(2, "60000000"), 1);
        cart.add_item(&product(2, "60000000"), 1);
        cart.update_quantity(2, i32::MAX);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.total_amount(), Decimal::from_str("60000000.00").unwrap());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "45"), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_amount(), Decimal::ZERO);
    }
}
