//! Cart and checkout against the real stack.

mod common;

use common::{cents, setup};
use quick_deals::errors::AppError;

#[tokio::test]
async fn test_checkout_empty_cart_writes_nothing() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;
    let standard = app.seed_delivery_option("Standard", cents(250)).await;

    let result = app
        .state
        .order_service
        .checkout(user.id, standard, "12 Rabbit Hole Lane".into())
        .await;

    assert!(matches!(result, Err(AppError::EmptyCart)));
    assert_eq!(app.count("orders").await, 0);
    assert_eq!(app.count("order_items").await, 0);
}

#[tokio::test]
async fn test_add_to_cart_merges_repeated_deal() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;
    let soup = app.seed_deal("Soup", cents(450)).await;

    app.state.cart_service.add_to_cart(user.id, soup, 1).await.unwrap();
    let cart = app.state.cart_service.add_to_cart(user.id, soup, 2).await.unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.subtotal, cents(1350));
    assert_eq!(app.count("carts").await, 1);
}

#[tokio::test]
async fn test_add_unknown_deal_not_found() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;

    let result = app.state.cart_service.add_to_cart(user.id, 999, 1).await;
    assert!(matches!(result, Err(AppError::NotFound("Deal"))));
    assert_eq!(app.count("carts").await, 0);
}

#[tokio::test]
async fn test_cart_without_rows_is_empty() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;

    let cart = app.state.cart_service.get_cart(user.id).await.unwrap();
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn test_checkout_totals_and_clears_cart() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;
    let soup = app.seed_deal("Soup", cents(450)).await;
    let bread = app.seed_deal("Bread", cents(225)).await;
    let express = app.seed_delivery_option("Express", cents(175)).await;

    let carts = &app.state.cart_service;
    carts.add_to_cart(user.id, soup, 2).await.unwrap();
    carts.add_to_cart(user.id, bread, 1).await.unwrap();

    let placed = app
        .state
        .order_service
        .checkout(user.id, express, "12 Rabbit Hole Lane".into())
        .await
        .unwrap();

    // 2 x 4.50 + 1 x 2.25 + 1.75
    assert_eq!(placed.total_amount, cents(1300));
    assert!(carts.get_cart(user.id).await.unwrap().items.is_empty());

    let order = app
        .state
        .order_service
        .get_order(&user, placed.order_id)
        .await
        .unwrap();
    assert_eq!(order.total_amount, cents(1300));
    assert_eq!(order.delivery_option_id, express);
    assert_eq!(order.items.len(), 2);

    let soup_line = order.items.iter().find(|i| i.food_id == soup).unwrap();
    assert_eq!(soup_line.quantity, 2);
    assert_eq!(soup_line.price_at_purchase, cents(450));
}

#[tokio::test]
async fn test_unknown_delivery_option_rolls_back() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;
    let soup = app.seed_deal("Soup", cents(450)).await;
    app.state.cart_service.add_to_cart(user.id, soup, 1).await.unwrap();

    let result = app
        .state
        .order_service
        .checkout(user.id, 404, "12 Rabbit Hole Lane".into())
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(app.count("orders").await, 0);
    assert_eq!(app.state.cart_service.get_cart(user.id).await.unwrap().items.len(), 1);
}

#[tokio::test]
async fn test_concurrent_checkout_places_one_order() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;
    let soup = app.seed_deal("Soup", cents(450)).await;
    let standard = app.seed_delivery_option("Standard", cents(250)).await;
    app.state.cart_service.add_to_cart(user.id, soup, 1).await.unwrap();

    let first = app.state.order_service.clone();
    let second = app.state.order_service.clone();
    let user_id = user.id;

    let (a, b) = tokio::join!(
        tokio::spawn(async move { first.checkout(user_id, standard, "here".into()).await }),
        tokio::spawn(async move { second.checkout(user_id, standard, "here".into()).await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(AppError::EmptyCart)))
            .count(),
        1
    );
    assert_eq!(app.count("orders").await, 1);
}

#[tokio::test]
async fn test_add_during_checkout_keeps_every_unit() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;
    let soup = app.seed_deal("Soup", cents(450)).await;
    let standard = app.seed_delivery_option("Standard", cents(250)).await;
    app.state.cart_service.add_to_cart(user.id, soup, 2).await.unwrap();

    let orders = app.state.order_service.clone();
    let carts = app.state.cart_service.clone();
    let user_id = user.id;

    let (placed, added) = tokio::join!(
        tokio::spawn(async move { orders.checkout(user_id, standard, "here".into()).await }),
        tokio::spawn(async move { carts.add_to_cart(user_id, soup, 3).await }),
    );
    placed.unwrap().unwrap();
    added.unwrap().unwrap();

    // Whichever ran first, the 5 units are either billed or still in the cart.
    let ordered: i32 = app
        .state
        .order_service
        .list_user_orders(user.id)
        .await
        .unwrap()
        .iter()
        .flat_map(|o| o.items.iter())
        .map(|i| i.quantity)
        .sum();
    let in_cart: i32 = app
        .state
        .cart_service
        .get_cart(user.id)
        .await
        .unwrap()
        .items
        .iter()
        .map(|l| l.quantity)
        .sum();
    assert_eq!(ordered + in_cart, 5);
    assert!(ordered == 2 || ordered == 5, "ordered {}", ordered);
}

#[tokio::test]
async fn test_price_change_does_not_touch_placed_order() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;
    let soup = app.seed_deal("Soup", cents(450)).await;
    let standard = app.seed_delivery_option("Standard", cents(250)).await;
    app.state.cart_service.add_to_cart(user.id, soup, 2).await.unwrap();

    let placed = app
        .state
        .order_service
        .checkout(user.id, standard, "here".into())
        .await
        .unwrap();

    app.set_deal_price(soup, cents(900)).await;

    let orders = app.state.order_service.list_user_orders(user.id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, placed.order_id);
    assert_eq!(orders[0].total_amount, cents(1150));
    assert_eq!(orders[0].items[0].price_at_purchase, cents(450));
}

#[tokio::test]
async fn test_user_without_orders_gets_empty_list() {
    let app = setup().await;
    let user = app.register("alice", "a@x.com", "p1").await;

    assert!(app.state.order_service.list_user_orders(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_options_cheapest_first() {
    let app = setup().await;
    app.seed_delivery_option("Express", cents(500)).await;
    app.seed_delivery_option("Standard", cents(250)).await;

    let options = app.state.order_service.list_delivery_options().await.unwrap();
    let names: Vec<_> = options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["Standard", "Express"]);
}
