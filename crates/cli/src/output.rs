//! Terminal rendering.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use food_delivery_core::{Cart, CurrencyCode, LineItem, OrderStatus, Price};
use food_delivery_storefront::api::{
    Address, HealthStatus, Order, OrderReceipt, Restaurant, Review, UserProfile,
};
use food_delivery_storefront::views::{
    AddressBook, OrderDetail, RestaurantDetail, RestaurantListing, TimelineProgress,
};
use rust_decimal::Decimal;

use crate::error::CliError;

/// Print an error and its field details to stderr.
pub fn failure(err: &CliError) {
    eprintln!("Error: {}", err.user_message());
    if let Some(fields) = err.field_errors() {
        for (field, message) in fields.iter() {
            eprintln!("  {field}: {message}");
        }
    }
}

pub fn notice(message: &str) {
    println!("{message}");
}

/// A non-fatal problem shown alongside the result.
pub fn banner(message: &str) {
    println!("! {message}");
}

pub fn health(status: &HealthStatus) {
    println!(
        "Backend: {}",
        status.status.as_deref().unwrap_or("ok")
    );
    if let Some(message) = &status.message {
        println!("{message}");
    }
}

pub fn user(user: &UserProfile) {
    println!("{} <{}> (#{})", user.name, user.email, user.id);
    if let Some(phone) = &user.phone {
        println!("Phone: {phone}");
    }
}

// =============================================================================
// Restaurants
// =============================================================================

pub fn restaurant_listing(listing: &RestaurantListing) {
    if let Some(error) = listing.state().error() {
        banner(error);
    }
    if listing.restaurants().is_empty() {
        println!("No restaurants found.");
        return;
    }
    for restaurant in listing.restaurants() {
        println!("{}", restaurant_row(restaurant));
    }
    println!(
        "Page {} of {}",
        listing.query().page.max(1),
        listing.total_pages()
    );
}

pub fn restaurant_detail(detail: &RestaurantDetail) {
    let Some(restaurant) = detail.restaurant() else {
        return;
    };
    println!("{}", restaurant_row(restaurant));
    if let Some(description) = &restaurant.description {
        println!("{description}");
    }
    if let Some(address) = &restaurant.address {
        println!("Address: {address}");
    }
    if let Some(phone) = &restaurant.phone {
        println!("Phone: {phone}");
    }

    for section in detail.menu_sections() {
        println!();
        println!("{}", section.category);
        for item in section.items {
            let unavailable = if item.available { "" } else { " (unavailable)" };
            println!(
                "  #{:<4} {:<28} {:>8}{unavailable}",
                item.id,
                item.name,
                money(item.price)
            );
        }
    }

    println!();
    reviews(detail.reviews());
}

pub fn reviews(reviews: &[Review]) {
    if reviews.is_empty() {
        println!("No reviews yet.");
        return;
    }
    println!("Reviews");
    for review in reviews {
        println!(
            "  {} {} - {}",
            stars(review.rating),
            review.user_name.as_deref().unwrap_or("Anonymous"),
            review.comment.as_deref().unwrap_or("")
        );
    }
}

fn restaurant_row(restaurant: &Restaurant) -> String {
    let mut row = format!("#{} {}", restaurant.id, restaurant.name);
    if !restaurant.cuisine.is_empty() {
        row.push_str(&format!(" - {}", restaurant.cuisine));
    }
    if let Some(rating) = restaurant.rating {
        row.push_str(&format!(" - {rating:.1}/5"));
    }
    if let Some(time) = &restaurant.delivery_time {
        row.push_str(&format!(" - {time}"));
    }
    row
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}

// =============================================================================
// Cart and checkout
// =============================================================================

pub fn cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for line in cart.items() {
        println!("{}", line_row(line));
    }
    println!("{} item(s), total {}", cart.count(), cart.total());
}

pub fn receipt(receipt: &OrderReceipt) {
    match receipt.order_id {
        Some(id) => println!("Order #{id} placed."),
        None => println!("Order placed."),
    }
    if let Some(message) = &receipt.message {
        println!("{message}");
    }
}

fn line_row(line: &LineItem) -> String {
    format!(
        "#{:<4} {:<28} {:>3} x {:>8} = {:>8}  {}",
        line.id,
        line.name,
        line.quantity(),
        line.unit_price.to_string(),
        line.line_total().to_string(),
        line.source_label
    )
}

// =============================================================================
// Orders
// =============================================================================

pub fn orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    for order in orders {
        println!("{}", order_row(order));
    }
}

pub fn order(detail: &OrderDetail) {
    let Some(order) = detail.order() else {
        return;
    };
    println!("{}", order_row(order));
    match detail.progress() {
        Some(progress) => println!("{}", timeline(progress)),
        None if order.status == OrderStatus::Cancelled => println!("This order was cancelled."),
        None => {}
    }
    if let Some(address) = &order.delivery_address {
        println!("Deliver to: {address}");
    }
    if let Some(method) = order.payment_method {
        println!("Payment: {method}");
    }
    if let Some(notes) = order.special_instructions.as_deref().filter(|n| !n.is_empty()) {
        println!("Instructions: {notes}");
    }
    for item in &order.items {
        println!(
            "  {:<28} {:>3} x {:>8} = {:>8}",
            item.name,
            item.quantity,
            money(item.price),
            money(item.line_total())
        );
    }
    if detail.can_cancel() {
        println!("This order can still be cancelled.");
    }
}

fn order_row(order: &Order) -> String {
    let placed = order
        .placed_at()
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    format!(
        "#{} {:<16} {:>9} {} {}",
        order.id,
        order.status.label(),
        money(order.total()),
        order.restaurant_name.as_deref().unwrap_or(""),
        placed
    )
    .trim_end()
    .to_string()
}

fn timeline(progress: TimelineProgress) -> String {
    OrderStatus::TIMELINE
        .iter()
        .enumerate()
        .map(|(i, status)| {
            if i < progress.reached {
                format!("[{}]", status.label())
            } else {
                status.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

// =============================================================================
// Addresses
// =============================================================================

pub fn addresses(book: &AddressBook) {
    if book.addresses().is_empty() {
        println!("No saved addresses.");
        return;
    }
    for address in book.addresses() {
        println!("{}", address_row(address));
    }
}

fn address_row(address: &Address) -> String {
    let default = if address.is_default { " (default)" } else { "" };
    format!(
        "#{} [{}] {}{default}",
        address.id,
        address.label,
        address.one_line()
    )
}

fn money(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::USD).to_string()
}
