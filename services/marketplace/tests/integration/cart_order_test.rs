use chrono::Utc;
use phonemart_domain::id::UserId;
use phonemart_domain::order::OrderStatus;
use phonemart_domain::user::Role;

use phonemart_marketplace::domain::types::{
    Audience, MAX_LINE_QUANTITY, NotificationEvent, Phone, User,
};
use phonemart_marketplace::error::MarketplaceError;
use phonemart_marketplace::usecase::cart::{
    AddToCartUseCase, ClearCartUseCase, GetCartUseCase, UpdateCartLineUseCase,
};
use phonemart_marketplace::usecase::order::{
    MyOrdersUseCase, MySalesUseCase, PlaceOrderInput, PlaceOrderUseCase,
    UpdateOrderStatusUseCase,
};

use crate::helpers::{
    CartRow, MockCartRepo, MockListingRepo, MockOrderRepo, MockUserRepo, RecordingEffects, Store,
    approved_phone, identity, pending_phone, test_user,
};

struct Market {
    store: Store,
    admin: User,
    seller: User,
    buyer: User,
}

fn market() -> Market {
    let store = Store::new();
    let admin = store.add_user(test_user(Role::Admin, "Ada"));
    let seller = store.add_user(test_user(Role::Seller, "Sam"));
    let buyer = store.add_user(test_user(Role::Buyer, "Bo"));
    Market {
        store,
        admin,
        seller,
        buyer,
    }
}

impl Market {
    fn listed(&self, seller: &User, title: &str, price: i64) -> Phone {
        self.store
            .add_phone(approved_phone(seller, &self.admin, title, price))
    }

    fn add_to_cart(
        &self,
        effects: &RecordingEffects,
    ) -> AddToCartUseCase<MockCartRepo, MockListingRepo, RecordingEffects> {
        AddToCartUseCase {
            carts: self.store.carts(),
            listings: self.store.listings(),
            effects: effects.clone(),
        }
    }

    fn place_order(
        &self,
        effects: &RecordingEffects,
    ) -> PlaceOrderUseCase<MockCartRepo, MockOrderRepo, MockUserRepo, RecordingEffects> {
        PlaceOrderUseCase {
            carts: self.store.carts(),
            orders: self.store.orders(),
            users: self.store.users(),
            effects: effects.clone(),
        }
    }
}

fn checkout_input() -> PlaceOrderInput {
    PlaceOrderInput {
        delivery_address: " 12 Harbour Rd ".to_owned(),
        contact_number: "555-0101".to_owned(),
    }
}

fn cart_notifications_for(effects: &RecordingEffects, user: UserId) -> usize {
    effects
        .notifications()
        .iter()
        .filter(|n| n.audience == Audience::User(user) && n.event.name() == "cart_updated")
        .count()
}

// ── Cart ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_add_to_cart_and_increment_existing_line() {
    let m = market();
    let phone = m.listed(&m.seller, "Galaxy S23", 50_000);
    let effects = RecordingEffects::new();
    let usecase = m.add_to_cart(&effects);

    usecase
        .execute(identity(&m.buyer), phone.id, None)
        .await
        .unwrap();
    let cart = usecase
        .execute(identity(&m.buyer), phone.id, Some(2))
        .await
        .unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.total_amount, 150_000);
    assert_eq!(cart_notifications_for(&effects, m.buyer.id), 2);
}

#[tokio::test]
async fn should_refuse_zero_quantity() {
    let m = market();
    let phone = m.listed(&m.seller, "Galaxy S23", 50_000);
    let result = m
        .add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.buyer), phone.id, Some(0))
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::InvalidQuantity)),
        "expected InvalidQuantity, got {result:?}"
    );
    assert!(m.store.cart_rows(m.buyer.id).is_empty());
}

#[tokio::test]
async fn should_refuse_quantity_above_line_cap() {
    let m = market();
    let phone = m.listed(&m.seller, "Galaxy S23", 50_000);
    let result = m
        .add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.buyer), phone.id, Some(MAX_LINE_QUANTITY + 1))
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::InvalidQuantity)),
        "expected InvalidQuantity, got {result:?}"
    );
    assert!(m.store.cart_rows(m.buyer.id).is_empty());
}

#[tokio::test]
async fn should_cap_merged_line_quantity() {
    let m = market();
    let phone = m.listed(&m.seller, "Galaxy S23", 50_000);
    let usecase = m.add_to_cart(&RecordingEffects::new());
    for _ in 0..2 {
        usecase
            .execute(identity(&m.buyer), phone.id, Some(60))
            .await
            .unwrap();
    }
    let rows = m.store.cart_rows(m.buyer.id);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, MAX_LINE_QUANTITY);
}

#[tokio::test]
async fn should_merge_concurrent_adds_of_same_listing() {
    let m = market();
    let phone = m.listed(&m.seller, "Galaxy S23", 50_000);
    let effects = RecordingEffects::new();
    let first = m.add_to_cart(&effects);
    let second = m.add_to_cart(&effects);

    let (a, b) = tokio::join!(
        first.execute(identity(&m.buyer), phone.id, Some(1)),
        second.execute(identity(&m.buyer), phone.id, Some(2)),
    );
    a.unwrap();
    b.unwrap();

    let rows = m.store.cart_rows(m.buyer.id);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 3);
    assert_eq!(cart_notifications_for(&effects, m.buyer.id), 2);
}

#[tokio::test]
async fn should_refuse_line_whose_total_overflows() {
    let m = market();
    let phone = m.listed(&m.seller, "Gold Edition", i64::MAX / 2 + 1);
    let effects = RecordingEffects::new();
    let result = m
        .add_to_cart(&effects)
        .execute(identity(&m.buyer), phone.id, Some(2))
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::TotalTooLarge)),
        "expected TotalTooLarge, got {result:?}"
    );
    assert!(m.store.cart_rows(m.buyer.id).is_empty());
    assert!(effects.notifications().is_empty());
}

#[tokio::test]
async fn should_refuse_unpurchasable_listing() {
    let m = market();
    let pending = m.store.add_phone(pending_phone(&m.seller, "Waiting", 1_000));
    let result = m
        .add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.buyer), pending.id, None)
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::ListingUnavailable)),
        "expected ListingUnavailable, got {result:?}"
    );
}

#[tokio::test]
async fn should_forbid_admin_cart() {
    let m = market();
    let phone = m.listed(&m.seller, "Galaxy S23", 50_000);
    let result = m
        .add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.admin), phone.id, None)
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
}

#[tokio::test]
async fn should_price_cart_at_current_listing_price() {
    let m = market();
    let phone = m.listed(&m.seller, "Galaxy S23", 50_000);
    m.add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.buyer), phone.id, None)
        .await
        .unwrap();
    m.store
        .data
        .lock()
        .unwrap()
        .phones
        .iter_mut()
        .find(|p| p.id == phone.id)
        .unwrap()
        .price = 45_000;

    let cart = GetCartUseCase {
        carts: m.store.carts(),
    }
    .execute(identity(&m.buyer))
    .await
    .unwrap();
    assert_eq!(cart.total_amount, 45_000);
}

#[tokio::test]
async fn should_update_and_remove_cart_lines() {
    let m = market();
    let a = m.listed(&m.seller, "A", 1_000);
    let b = m.listed(&m.seller, "B", 2_000);
    let effects = RecordingEffects::new();
    let add = m.add_to_cart(&effects);
    add.execute(identity(&m.buyer), a.id, None).await.unwrap();
    add.execute(identity(&m.buyer), b.id, None).await.unwrap();

    let update = UpdateCartLineUseCase {
        carts: m.store.carts(),
        effects: effects.clone(),
    };
    let cart = update
        .execute(identity(&m.buyer), a.id, 4)
        .await
        .unwrap();
    assert_eq!(cart.total_amount, 6_000);

    let cart = update
        .execute(identity(&m.buyer), b.id, 0)
        .await
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total_amount, 4_000);
    assert_eq!(cart_notifications_for(&effects, m.buyer.id), 4);
}

#[tokio::test]
async fn should_not_publish_when_line_is_absent() {
    let m = market();
    let phone = m.listed(&m.seller, "A", 1_000);
    let effects = RecordingEffects::new();
    let cart = UpdateCartLineUseCase {
        carts: m.store.carts(),
        effects: effects.clone(),
    }
    .execute(identity(&m.buyer), phone.id, 3)
    .await
    .unwrap();
    assert!(cart.is_empty());
    assert!(effects.notifications().is_empty());
}

#[tokio::test]
async fn should_clear_cart() {
    let m = market();
    let phone = m.listed(&m.seller, "A", 1_000);
    let effects = RecordingEffects::new();
    m.add_to_cart(&effects)
        .execute(identity(&m.buyer), phone.id, Some(2))
        .await
        .unwrap();

    let cart = ClearCartUseCase {
        carts: m.store.carts(),
        effects: effects.clone(),
    }
    .execute(identity(&m.buyer))
    .await
    .unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.total_amount, 0);
    assert!(m.store.cart_rows(m.buyer.id).is_empty());
}

#[tokio::test]
async fn should_drop_cart_lines_of_deleted_listing() {
    let m = market();
    let phone = m.listed(&m.seller, "A", 1_000);
    m.add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.buyer), phone.id, None)
        .await
        .unwrap();
    m.store.data.lock().unwrap().phones.retain(|p| p.id != phone.id);

    let cart = GetCartUseCase {
        carts: m.store.carts(),
    }
    .execute(identity(&m.buyer))
    .await
    .unwrap();
    assert!(cart.is_empty());
}

// ── PlaceOrderUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_place_order_and_fan_out_to_each_seller() {
    let m = market();
    let other_seller = m.store.add_user(test_user(Role::Seller, "Olly"));
    let a = m.listed(&m.seller, "A", 1_000);
    let b = m.listed(&other_seller, "B", 2_000);
    let effects = RecordingEffects::new();
    let add = m.add_to_cart(&effects);
    add.execute(identity(&m.buyer), a.id, Some(2)).await.unwrap();
    add.execute(identity(&m.buyer), b.id, None).await.unwrap();
    effects.effects_handle().lock().unwrap().clear();

    let order = m
        .place_order(&effects)
        .execute(identity(&m.buyer), checkout_input())
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, 4_000);
    assert_eq!(order.delivery_address, "12 Harbour Rd");
    assert_eq!(order.buyer_id, m.buyer.id);
    assert!(m.store.cart_rows(m.buyer.id).is_empty());
    assert!(!m.store.phone(a.id).unwrap().is_available);
    assert!(!m.store.phone(b.id).unwrap().is_available);

    let new_orders: Vec<_> = effects
        .notifications()
        .into_iter()
        .filter_map(|n| match (n.audience, n.event) {
            (Audience::User(to), NotificationEvent::NewOrder { items, .. }) => Some((to, items)),
            _ => None,
        })
        .collect();
    assert_eq!(new_orders.len(), 2);
    for (seller, items) in &new_orders {
        assert!(items.iter().all(|i| i.seller_id == *seller));
    }
    assert_eq!(cart_notifications_for(&effects, m.buyer.id), 1);

    let emails = effects.emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, m.buyer.email);
    assert!(emails[0].body.contains("12 Harbour Rd"));
}

#[tokio::test]
async fn should_refuse_empty_cart() {
    let m = market();
    let effects = RecordingEffects::new();
    let result = m
        .place_order(&effects)
        .execute(identity(&m.buyer), checkout_input())
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::EmptyCart)),
        "expected EmptyCart, got {result:?}"
    );
    assert_eq!(m.store.order_count(), 0);
    assert!(effects.effects_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_refuse_order_whose_total_overflows() {
    let m = market();
    let effects = RecordingEffects::new();
    for title in ["Gold A", "Gold B"] {
        let phone = m.listed(&m.seller, title, i64::MAX / 2 + 1);
        m.store.data.lock().unwrap().cart.push(CartRow {
            user: m.buyer.id,
            phone: phone.id,
            quantity: 1,
            added_at: Utc::now(),
        });
    }

    let result = m
        .place_order(&effects)
        .execute(identity(&m.buyer), checkout_input())
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::TotalTooLarge)),
        "expected TotalTooLarge, got {result:?}"
    );
    assert_eq!(m.store.order_count(), 0);
    assert_eq!(m.store.cart_rows(m.buyer.id).len(), 2);
    assert!(effects.effects_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_require_delivery_details() {
    let m = market();
    let phone = m.listed(&m.seller, "A", 1_000);
    m.add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.buyer), phone.id, None)
        .await
        .unwrap();

    let result = m
        .place_order(&RecordingEffects::new())
        .execute(
            identity(&m.buyer),
            PlaceOrderInput {
                delivery_address: "   ".to_owned(),
                contact_number: "555".to_owned(),
            },
        )
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::MissingData)),
        "expected MissingData, got {result:?}"
    );
    assert_eq!(m.store.cart_rows(m.buyer.id).len(), 1);
}

#[tokio::test]
async fn should_refuse_checkout_of_sold_listing_and_keep_cart() {
    let m = market();
    let second_buyer = m.store.add_user(test_user(Role::Buyer, "Cy"));
    let phone = m.listed(&m.seller, "Only one", 1_000);
    let add = m.add_to_cart(&RecordingEffects::new());
    add.execute(identity(&m.buyer), phone.id, None).await.unwrap();
    add.execute(identity(&second_buyer), phone.id, None)
        .await
        .unwrap();

    m.place_order(&RecordingEffects::new())
        .execute(identity(&m.buyer), checkout_input())
        .await
        .unwrap();
    let effects = RecordingEffects::new();
    let result = m
        .place_order(&effects)
        .execute(identity(&second_buyer), checkout_input())
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::ListingSoldOut)),
        "expected ListingSoldOut, got {result:?}"
    );
    assert_eq!(m.store.order_count(), 1);
    assert_eq!(m.store.cart_rows(second_buyer.id).len(), 1);
    assert!(effects.effects_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_keep_order_when_email_fails() {
    let m = market();
    let phone = m.listed(&m.seller, "A", 1_000);
    m.add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.buyer), phone.id, None)
        .await
        .unwrap();

    let effects = RecordingEffects::failing();
    let order = m
        .place_order(&effects)
        .execute(identity(&m.buyer), checkout_input())
        .await
        .unwrap();
    assert_eq!(m.store.order_count(), 1);
    assert_eq!(effects.emails().len(), 1);
    assert_eq!(order.items.len(), 1);
}

// ── Order history ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_split_sales_view_per_seller() {
    let m = market();
    let other_seller = m.store.add_user(test_user(Role::Seller, "Olly"));
    let a = m.listed(&m.seller, "A", 1_000);
    let b = m.listed(&other_seller, "B", 2_000);
    let add = m.add_to_cart(&RecordingEffects::new());
    add.execute(identity(&m.buyer), a.id, None).await.unwrap();
    add.execute(identity(&m.buyer), b.id, None).await.unwrap();
    m.place_order(&RecordingEffects::new())
        .execute(identity(&m.buyer), checkout_input())
        .await
        .unwrap();

    let mine = MyOrdersUseCase {
        orders: m.store.orders(),
    }
    .execute(identity(&m.buyer))
    .await
    .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].items.len(), 2);

    let sales = MySalesUseCase {
        orders: m.store.orders(),
    }
    .execute(identity(&other_seller))
    .await
    .unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].items.len(), 1);
    assert_eq!(sales[0].items[0].phone_id, b.id);

    let buyer_sales = MySalesUseCase {
        orders: m.store.orders(),
    }
    .execute(identity(&m.buyer))
    .await;
    assert!(
        matches!(buyer_sales, Err(MarketplaceError::Forbidden)),
        "expected Forbidden, got {buyer_sales:?}"
    );
}

// ── UpdateOrderStatusUseCase ─────────────────────────────────────────────────

#[tokio::test]
async fn should_walk_order_through_lifecycle_and_notify_buyer() {
    let m = market();
    let phone = m.listed(&m.seller, "A", 1_000);
    m.add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.buyer), phone.id, None)
        .await
        .unwrap();
    let order = m
        .place_order(&RecordingEffects::new())
        .execute(identity(&m.buyer), checkout_input())
        .await
        .unwrap();

    let effects = RecordingEffects::new();
    let usecase = UpdateOrderStatusUseCase {
        orders: m.store.orders(),
        effects: effects.clone(),
    };
    let confirmed = usecase
        .execute(identity(&m.admin), order.id, OrderStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    let completed = usecase
        .execute(identity(&m.admin), order.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    let result = usecase
        .execute(identity(&m.admin), order.id, OrderStatus::Cancelled)
        .await;
    assert!(
        matches!(
            result,
            Err(MarketplaceError::InvalidOrderTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Cancelled
            })
        ),
        "expected InvalidOrderTransition, got {result:?}"
    );

    let sent = effects.notifications();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|n| n.audience == Audience::User(m.buyer.id)));
}

#[tokio::test]
async fn should_forbid_non_admin_status_change() {
    let m = market();
    let phone = m.listed(&m.seller, "A", 1_000);
    m.add_to_cart(&RecordingEffects::new())
        .execute(identity(&m.buyer), phone.id, None)
        .await
        .unwrap();
    let order = m
        .place_order(&RecordingEffects::new())
        .execute(identity(&m.buyer), checkout_input())
        .await
        .unwrap();

    let usecase = UpdateOrderStatusUseCase {
        orders: m.store.orders(),
        effects: RecordingEffects::new(),
    };
    for actor in [identity(&m.buyer), identity(&m.seller)] {
        let result = usecase
            .execute(actor, order.id, OrderStatus::Confirmed)
            .await;
        assert!(
            matches!(result, Err(MarketplaceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );
    }
}
