use std::sync::Arc;

use chrono::Utc;
use cove_core::cart::CartItem;
use cove_core::guests::GuestBooking;
use cove_core::messaging::Chat;
use cove_core::payment::{
    BillingAddress, CreateIntent, CustomerDetails, PaymentGateway, TransferSplit,
};
use cove_core::pii::Masked;
use cove_core::property::{GuestContact, PropertyApi, ReservationDraft, TransactionDraft};
use cove_core::repository::{ChatRepository, GuestRepository};
use cove_core::BoxError;
use cove_pricing::{cart_total_minor, extra_minor, extras_minor, prorate_stay, to_minor, ProratedStay};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::email::Notifier;
use crate::models::{CompanyDetails, ContactDetails, Order, OrderItem};
use crate::reference::order_reference;
use crate::repository::OrderRepository;

/// Storefront price may trail the live quote by this much (major units)
/// before we log it.
const PRICE_DRIFT_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub contact: ContactDetails,
    pub billing: Option<BillingAddress>,
    pub company: Option<CompanyDetails>,
    pub items: Vec<CartItem>,
}

/// What the storefront needs to finish the purchase client-side.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub order_id: String,
    pub payment_intent_id: String,
    pub client_secret: String,
    pub reservation_ids: Vec<i64>,
    pub reservation_references: Vec<String>,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart has no items")]
    EmptyCart,
    #[error("pricing failed for listing {listing_id}: {source}")]
    Pricing {
        listing_id: i64,
        #[source]
        source: BoxError,
    },
    #[error("reservation failed for listing {listing_id}: {source}")]
    Reservation {
        listing_id: i64,
        #[source]
        source: BoxError,
    },
    #[error("transaction failed for reservation {reservation_id}: {source}")]
    Transaction {
        reservation_id: i64,
        #[source]
        source: BoxError,
    },
    #[error("checkout records could not be stored: {source}")]
    Store {
        #[source]
        source: BoxError,
    },
    #[error("payment intent could not be created: {source}")]
    Payment {
        #[source]
        source: BoxError,
    },
    #[error("order could not be persisted: {source}")]
    Persistence {
        #[source]
        source: BoxError,
    },
}

/// A stay that has been registered with the channel manager.
struct BookedStay {
    reservation_id: i64,
    confirmation_code: String,
    transaction_id: i64,
    priced: ProratedStay,
}

/// One processed cart line, index-aligned with the request items.
enum Line {
    Stay(BookedStay),
    Extra,
}

/// Runs the whole purchase: prices and registers each stay with the
/// channel manager, opens one payment intent for the cart, writes the
/// order, and sends the confirmation mail.
///
/// The supplier calls are not transactional. When a later step fails,
/// reservations already placed are cancelled best-effort so the calendar
/// does not keep phantom blocks.
pub struct CheckoutService {
    property: Arc<dyn PropertyApi>,
    payments: Arc<dyn PaymentGateway>,
    orders: Arc<dyn OrderRepository>,
    chats: Arc<dyn ChatRepository>,
    guests: Arc<dyn GuestRepository>,
    notifier: Arc<Notifier>,
    currency: String,
    /// Connected account receiving the tour and product share of a charge.
    partner_account: Option<String>,
}

impl CheckoutService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        property: Arc<dyn PropertyApi>,
        payments: Arc<dyn PaymentGateway>,
        orders: Arc<dyn OrderRepository>,
        chats: Arc<dyn ChatRepository>,
        guests: Arc<dyn GuestRepository>,
        notifier: Arc<Notifier>,
        currency: String,
        partner_account: Option<String>,
    ) -> Self {
        Self { property, payments, orders, chats, guests, notifier, currency, partner_account }
    }

    pub async fn buy_cart(&self, request: CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        if request.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut reserved: Vec<i64> = Vec::new();
        let mut lines: Vec<Line> = Vec::new();

        if let Err(err) = self.register_items(&request, &mut reserved, &mut lines).await {
            self.release(&reserved).await;
            return Err(err);
        }

        match self.settle(&request, lines).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.release(&reserved).await;
                Err(err)
            }
        }
    }

    /// Walk the cart in order. Each accommodation line is quoted, clamped,
    /// reserved and charged against the channel manager, and gets its chat
    /// thread and guest registration record.
    async fn register_items(
        &self,
        request: &CheckoutRequest,
        reserved: &mut Vec<i64>,
        lines: &mut Vec<Line>,
    ) -> Result<(), CheckoutError> {
        for item in &request.items {
            let stay = match item {
                CartItem::Accommodation(stay) => stay,
                _ => {
                    lines.push(Line::Extra);
                    continue;
                }
            };

            let quote = self
                .property
                .quote_stay(stay.listing_id, stay.start_date, stay.end_date, &stay.guests)
                .await
                .map_err(|source| CheckoutError::Pricing { listing_id: stay.listing_id, source })?;
            let priced = prorate_stay(&quote, stay.guests.adults, stay.nights());

            if (priced.total - stay.front_end_price).abs() > PRICE_DRIFT_TOLERANCE {
                warn!(
                    listing_id = stay.listing_id,
                    quoted = priced.total,
                    displayed = stay.front_end_price,
                    "checkout price differs from storefront price"
                );
            }

            let draft = ReservationDraft {
                listing_id: stay.listing_id,
                start_date: stay.start_date,
                end_date: stay.end_date,
                guest: GuestContact {
                    name: request.contact.name.clone(),
                    email: request.contact.email.clone(),
                    phone: request.contact.phone.clone(),
                },
                guests: stay.guests,
                total: priced.total,
                currency: self.currency.clone(),
                notes: request.contact.notes.clone(),
            };
            let created = self
                .property
                .create_reservation(&draft)
                .await
                .map_err(|source| CheckoutError::Reservation { listing_id: stay.listing_id, source })?;
            reserved.push(created.reservation_id);
            info!(
                reservation_id = created.reservation_id,
                confirmation = %created.confirmation_code,
                listing_id = stay.listing_id,
                "reservation placed"
            );

            let transaction_id = self
                .property
                .create_transaction(&TransactionDraft {
                    reservation_id: created.reservation_id,
                    amount: priced.total,
                    currency: self.currency.clone(),
                    kind: "accommodation".to_string(),
                    notes: Some(format!("Card payment for {}", created.confirmation_code)),
                })
                .await
                .map_err(|source| CheckoutError::Transaction {
                    reservation_id: created.reservation_id,
                    source,
                })?;

            let chat = Chat::new(
                created.reservation_id,
                created.confirmation_code.clone(),
                request.contact.name.clone(),
            );
            self.chats
                .create_chat(&chat)
                .await
                .map_err(|source| CheckoutError::Store { source })?;

            let booking = GuestBooking::new(created.confirmation_code.clone(), stay.listing_id);
            self.guests
                .create_booking(&booking)
                .await
                .map_err(|source| CheckoutError::Store { source })?;

            lines.push(Line::Stay(BookedStay {
                reservation_id: created.reservation_id,
                confirmation_code: created.confirmation_code,
                transaction_id,
                priced,
            }));
        }
        Ok(())
    }

    /// Open the payment intent for the whole cart and persist the order.
    async fn settle(
        &self,
        request: &CheckoutRequest,
        lines: Vec<Line>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let accommodation: i64 = lines
            .iter()
            .filter_map(|line| match line {
                Line::Stay(stay) => Some(to_minor(stay.priced.total)),
                Line::Extra => None,
            })
            .sum();
        let amount_minor = cart_total_minor(accommodation, &request.items);
        let extras = extras_minor(&request.items);

        let split = self
            .partner_account
            .as_ref()
            .filter(|_| extras > 0)
            .map(|account| TransferSplit {
                destination_account: account.clone(),
                amount_minor: extras,
            });

        let reservation_ids: Vec<i64> = lines
            .iter()
            .filter_map(|line| match line {
                Line::Stay(stay) => Some(stay.reservation_id),
                Line::Extra => None,
            })
            .collect();
        let activity_ids: Vec<i64> = request
            .items
            .iter()
            .filter_map(|item| match item {
                CartItem::Tour(tour) => Some(tour.activity_id),
                _ => None,
            })
            .collect();

        let intent = self
            .payments
            .create_intent(&CreateIntent {
                amount_minor,
                currency: self.currency.clone(),
                customer: CustomerDetails {
                    name: request.contact.name.clone(),
                    email: Masked(request.contact.email.clone()),
                    phone: Masked(request.contact.phone.clone()),
                },
                billing: request.billing.clone(),
                reservation_ids,
                activity_ids,
                split,
            })
            .await
            .map_err(|source| CheckoutError::Payment { source })?;

        let mut order = Order::new(
            order_reference(Utc::now()),
            &request.contact,
            request.company.clone(),
            intent.intent_id.clone(),
            self.currency.clone(),
        );
        for (item, line) in request.items.iter().zip(lines) {
            let charged = match line {
                Line::Stay(stay) => {
                    order.add_reservation(stay.reservation_id, stay.confirmation_code);
                    order.transaction_ids.push(stay.transaction_id);
                    to_minor(stay.priced.total)
                }
                Line::Extra => extra_minor(item),
            };
            order.add_item(OrderItem::new(item.clone(), charged));
        }

        self.orders
            .create_order(&order)
            .await
            .map_err(|source| CheckoutError::Persistence { source })?;
        info!(
            order_id = %order.order_id,
            amount_minor,
            intent = %intent.intent_id,
            "checkout completed"
        );

        self.notifier.order_confirmation(&order).await;

        Ok(CheckoutOutcome {
            order_id: order.order_id,
            payment_intent_id: intent.intent_id,
            client_secret: intent.client_secret,
            reservation_ids: order.reservation_ids,
            reservation_references: order.reservation_references,
            amount_minor,
            currency: self.currency.clone(),
        })
    }

    /// Cancel reservations left behind by an aborted checkout. Failures are
    /// logged for manual cleanup; there is nothing further to unwind.
    async fn release(&self, reserved: &[i64]) {
        for reservation_id in reserved {
            if let Err(err) = self.property.cancel_reservation(*reservation_id).await {
                error!(
                    reservation_id,
                    error = %err,
                    "could not release reservation after aborted checkout"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use cove_core::cart::{AccommodationItem, GuestBreakdown, ProductItem, TourItem};
    use cove_core::guests::GuestIdentity;
    use cove_core::mailer::{Mailer, OutboundEmail};
    use cove_core::messaging::{Message, MessageSender};
    use cove_core::payment::{IntentStatus, IssuedIntent, PaymentStatus};
    use cove_core::property::{CreatedReservation, Fee, Reservation, ReservationStatus, StayQuote};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct MockProperty {
        quotes: AtomicUsize,
        reservations: AtomicUsize,
        transactions: AtomicUsize,
        cancelled: Mutex<Vec<i64>>,
        fail_transaction_at: Option<usize>,
    }

    #[async_trait]
    impl PropertyApi for MockProperty {
        async fn list_listings(&self, _page: u32) -> Result<Vec<Value>, BoxError> {
            Ok(vec![])
        }

        async fn get_listing(&self, _listing_id: i64) -> Result<Option<Value>, BoxError> {
            Ok(None)
        }

        async fn quote_stay(
            &self,
            listing_id: i64,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
            _guests: &GuestBreakdown,
        ) -> Result<StayQuote, BoxError> {
            self.quotes.fetch_add(1, Ordering::SeqCst);
            // Three-night stay for a party of three: nine city tax units.
            Ok(StayQuote {
                listing_id,
                currency: "EUR".into(),
                nightly_total: 300.0,
                fees: vec![Fee {
                    fee_id: Some(7),
                    fee_name: "City Tax".into(),
                    quantity: 9.0,
                    total: 45.0,
                    total_net: 40.0,
                    total_tax: 5.0,
                    inclusive_percent: 0.0,
                }],
                total: 345.0,
            })
        }

        async fn create_reservation(
            &self,
            _draft: &ReservationDraft,
        ) -> Result<CreatedReservation, BoxError> {
            let n = self.reservations.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(CreatedReservation {
                reservation_id: 88100 + n as i64,
                confirmation_code: format!("HMX{:04}", n),
                status: ReservationStatus::Pending,
            })
        }

        async fn create_transaction(&self, draft: &TransactionDraft) -> Result<i64, BoxError> {
            let n = self.transactions.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_transaction_at == Some(n) {
                return Err(format!(
                    "transaction ledger rejected reservation {}",
                    draft.reservation_id
                )
                .into());
            }
            Ok(77000 + n as i64)
        }

        async fn list_reservations(&self, _page: u32) -> Result<Vec<Reservation>, BoxError> {
            Ok(vec![])
        }

        async fn get_reservation(
            &self,
            _reservation_id: i64,
        ) -> Result<Option<Reservation>, BoxError> {
            Ok(None)
        }

        async fn cancel_reservation(&self, reservation_id: i64) -> Result<(), BoxError> {
            self.cancelled.lock().unwrap().push(reservation_id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockGateway {
        intents: Mutex<Vec<CreateIntent>>,
        fail: bool,
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn create_intent(&self, request: &CreateIntent) -> Result<IssuedIntent, BoxError> {
            if self.fail {
                return Err("card network unavailable".into());
            }
            self.intents.lock().unwrap().push(request.clone());
            Ok(IssuedIntent {
                intent_id: "pi_mock_1".into(),
                client_secret: "pi_mock_1_secret_abc".into(),
                customer_id: "cus_mock_1".into(),
                status: PaymentStatus::RequiresPaymentMethod,
            })
        }

        async fn get_intent(&self, intent_id: &str) -> Result<IntentStatus, BoxError> {
            Ok(IntentStatus {
                intent_id: intent_id.into(),
                status: PaymentStatus::Succeeded,
                amount_minor: 0,
                currency: "EUR".into(),
            })
        }
    }

    #[derive(Default)]
    struct MemoryOrders {
        orders: Mutex<Vec<Order>>,
    }

    #[async_trait]
    impl OrderRepository for MemoryOrders {
        async fn create_order(&self, order: &Order) -> Result<(), BoxError> {
            self.orders.lock().unwrap().push(order.clone());
            Ok(())
        }

        async fn get_order(&self, order_id: &str) -> Result<Option<Order>, BoxError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .find(|order| order.order_id == order_id)
                .cloned())
        }

        async fn find_by_reference(&self, reference: &str) -> Result<Option<Order>, BoxError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .find(|order| order.reservation_references.iter().any(|r| r == reference))
                .cloned())
        }

        async fn list_orders(&self, _limit: i64, _offset: i64) -> Result<Vec<Order>, BoxError> {
            Ok(self.orders.lock().unwrap().clone())
        }

        async fn attach_invoice(
            &self,
            order_id: &str,
            item_index: usize,
            invoice_url: &str,
        ) -> Result<(), BoxError> {
            let mut orders = self.orders.lock().unwrap();
            if let Some(order) = orders.iter_mut().find(|order| order.order_id == order_id) {
                if let Some(item) = order.items.get_mut(item_index) {
                    item.invoice_url = Some(invoice_url.to_string());
                }
            }
            Ok(())
        }

        async fn delete_order(&self, order_id: &str) -> Result<bool, BoxError> {
            let mut orders = self.orders.lock().unwrap();
            let before = orders.len();
            orders.retain(|order| order.order_id != order_id);
            Ok(orders.len() < before)
        }
    }

    #[derive(Default)]
    struct MemoryChats {
        chats: Mutex<Vec<Chat>>,
        messages: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl ChatRepository for MemoryChats {
        async fn create_chat(&self, chat: &Chat) -> Result<(), BoxError> {
            self.chats.lock().unwrap().push(chat.clone());
            Ok(())
        }

        async fn get_chat(&self, chat_id: Uuid) -> Result<Option<Chat>, BoxError> {
            Ok(self.chats.lock().unwrap().iter().find(|c| c.chat_id == chat_id).cloned())
        }

        async fn find_by_reservation(&self, reservation_id: i64) -> Result<Option<Chat>, BoxError> {
            Ok(self
                .chats
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.reservation_id == reservation_id)
                .cloned())
        }

        async fn list_chats(&self, _limit: i64, _offset: i64) -> Result<Vec<Chat>, BoxError> {
            Ok(self.chats.lock().unwrap().clone())
        }

        async fn append_message(&self, message: &Message) -> Result<(), BoxError> {
            self.messages.lock().unwrap().push(message.clone());
            let mut chats = self.chats.lock().unwrap();
            if let Some(chat) = chats.iter_mut().find(|c| c.chat_id == message.chat_id) {
                chat.last_message = Some(message.body.clone());
                chat.last_message_at = Some(message.created_at);
                if message.sender == MessageSender::Guest {
                    chat.unread += 1;
                }
            }
            Ok(())
        }

        async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<Message>, BoxError> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.chat_id == chat_id)
                .cloned()
                .collect())
        }

        async fn mark_read(&self, chat_id: Uuid) -> Result<(), BoxError> {
            if let Some(chat) =
                self.chats.lock().unwrap().iter_mut().find(|c| c.chat_id == chat_id)
            {
                chat.unread = 0;
            }
            Ok(())
        }

        async fn total_unread(&self) -> Result<i64, BoxError> {
            Ok(self.chats.lock().unwrap().iter().map(|c| c.unread as i64).sum())
        }
    }

    #[derive(Default)]
    struct MemoryGuests {
        bookings: Mutex<Vec<GuestBooking>>,
    }

    #[async_trait]
    impl GuestRepository for MemoryGuests {
        async fn create_booking(&self, booking: &GuestBooking) -> Result<(), BoxError> {
            self.bookings.lock().unwrap().push(booking.clone());
            Ok(())
        }

        async fn get_booking(&self, booking_code: &str) -> Result<Option<GuestBooking>, BoxError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.booking_code == booking_code)
                .cloned())
        }

        async fn append_guests(
            &self,
            booking_code: &str,
            guests: &[GuestIdentity],
        ) -> Result<GuestBooking, BoxError> {
            let mut bookings = self.bookings.lock().unwrap();
            let booking = bookings
                .iter_mut()
                .find(|b| b.booking_code == booking_code)
                .ok_or("no such booking")?;
            booking.guests.extend_from_slice(guests);
            booking.synced = false;
            Ok(booking.clone())
        }

        async fn list_bookings(
            &self,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<GuestBooking>, BoxError> {
            Ok(self.bookings.lock().unwrap().clone())
        }

        async fn mark_synced(&self, booking_code: &str, succeeded: bool) -> Result<(), BoxError> {
            if let Some(booking) = self
                .bookings
                .lock()
                .unwrap()
                .iter_mut()
                .find(|b| b.booking_code == booking_code)
            {
                booking.synced = true;
                booking.succeeded = succeeded;
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockMailer {
        sent: Mutex<Vec<OutboundEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, email: &OutboundEmail) -> Result<(), BoxError> {
            if self.fail {
                return Err("smtp relay refused connection".into());
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Options {
        fail_transaction_at: Option<usize>,
        gateway_fails: bool,
        mailer_fails: bool,
        no_partner: bool,
    }

    struct Harness {
        property: Arc<MockProperty>,
        gateway: Arc<MockGateway>,
        orders: Arc<MemoryOrders>,
        chats: Arc<MemoryChats>,
        guests: Arc<MemoryGuests>,
        mailer: Arc<MockMailer>,
        service: CheckoutService,
    }

    fn harness(options: Options) -> Harness {
        let property = Arc::new(MockProperty {
            fail_transaction_at: options.fail_transaction_at,
            ..MockProperty::default()
        });
        let gateway = Arc::new(MockGateway { fail: options.gateway_fails, ..MockGateway::default() });
        let orders = Arc::new(MemoryOrders::default());
        let chats = Arc::new(MemoryChats::default());
        let guests = Arc::new(MemoryGuests::default());
        let mailer = Arc::new(MockMailer { fail: options.mailer_fails, ..MockMailer::default() });
        let notifier = Arc::new(Notifier::new(
            mailer.clone() as Arc<dyn Mailer>,
            PathBuf::from("/nonexistent/templates"),
            "inbox@covestays.example".into(),
        ));
        let partner = if options.no_partner { None } else { Some("acct_partner88".to_string()) };
        let service = CheckoutService::new(
            property.clone(),
            gateway.clone(),
            orders.clone(),
            chats.clone(),
            guests.clone(),
            notifier,
            "EUR".into(),
            partner,
        );
        Harness { property, gateway, orders, chats, guests, mailer, service }
    }

    fn stay_item() -> CartItem {
        CartItem::Accommodation(AccommodationItem {
            listing_id: 40210,
            start_date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 7).unwrap(),
            guests: GuestBreakdown { adults: 2, children: 1, infants: 0, pets: 0 },
            front_end_price: 330.0,
        })
    }

    fn tour_item() -> CartItem {
        CartItem::Tour(TourItem {
            activity_id: 9921,
            date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
            rate_id: 1,
            start_time_id: 3,
            guests: HashMap::from([("ADT".to_string(), 2)]),
            price: 89.9,
        })
    }

    fn product_item() -> CartItem {
        CartItem::Product(ProductItem {
            product_id: "late-checkout".into(),
            price: 17.5,
            quantity: 2,
        })
    }

    fn request(items: Vec<CartItem>) -> CheckoutRequest {
        CheckoutRequest {
            contact: ContactDetails {
                name: "Ada Kovacs".into(),
                email: "ada@example.com".into(),
                phone: "+36 20 555 0101".into(),
                notes: Some("Late arrival".into()),
            },
            billing: None,
            company: None,
            items,
        }
    }

    #[tokio::test]
    async fn full_cart_books_each_stay_and_opens_one_intent() {
        let h = harness(Options::default());
        let outcome = h.service.buy_cart(request(vec![stay_item(), tour_item()])).await.unwrap();

        assert_eq!(h.property.quotes.load(Ordering::SeqCst), 1);
        assert_eq!(h.property.reservations.load(Ordering::SeqCst), 1);
        assert_eq!(h.property.transactions.load(Ordering::SeqCst), 1);

        // 345.00 quoted, 15.00 of city tax over the 6 person-night cap,
        // plus the 89.90 tour.
        assert_eq!(outcome.amount_minor, 33000 + 8990);
        assert_eq!(outcome.reservation_ids, vec![88101]);
        assert_eq!(outcome.reservation_references, vec!["HMX0001".to_string()]);
        assert_eq!(outcome.client_secret, "pi_mock_1_secret_abc");

        let intents = h.gateway.intents.lock().unwrap();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].amount_minor, 41990);
        assert_eq!(intents[0].reservation_ids, vec![88101]);
        assert_eq!(intents[0].activity_ids, vec![9921]);
        let split = intents[0].split.as_ref().unwrap();
        assert_eq!(split.destination_account, "acct_partner88");
        assert_eq!(split.amount_minor, 8990);

        let orders = h.orders.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].order_id.starts_with("CV-"));
        assert_eq!(orders[0].amount_minor, 41990);
        assert_eq!(orders[0].transaction_ids, vec![77001]);
        assert_eq!(orders[0].items.len(), 2);

        assert_eq!(h.chats.chats.lock().unwrap().len(), 1);
        assert_eq!(h.guests.bookings.lock().unwrap().len(), 1);
        assert_eq!(h.mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn two_stay_cart_registers_each_stay_once() {
        let h = harness(Options::default());
        let outcome = h.service.buy_cart(request(vec![stay_item(), stay_item()])).await.unwrap();

        assert_eq!(h.property.quotes.load(Ordering::SeqCst), 2);
        assert_eq!(h.property.reservations.load(Ordering::SeqCst), 2);
        assert_eq!(h.property.transactions.load(Ordering::SeqCst), 2);
        assert_eq!(h.chats.chats.lock().unwrap().len(), 2);
        assert_eq!(h.guests.bookings.lock().unwrap().len(), 2);

        assert_eq!(outcome.reservation_ids, vec![88101, 88102]);
        assert_eq!(
            outcome.reservation_references,
            vec!["HMX0001".to_string(), "HMX0002".to_string()]
        );
        assert_eq!(outcome.amount_minor, 66000);

        let intents = h.gateway.intents.lock().unwrap();
        assert_eq!(intents.len(), 1, "one intent for the whole cart");
        // Accommodation money never moves to the partner account.
        assert!(intents[0].split.is_none());
        assert_eq!(h.orders.orders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn order_is_findable_by_its_booking_reference() {
        let h = harness(Options::default());
        let outcome = h.service.buy_cart(request(vec![stay_item()])).await.unwrap();

        let found = h
            .orders
            .find_by_reference("HMX0001")
            .await
            .unwrap()
            .expect("order should be reachable through its reference");
        assert_eq!(found.order_id, outcome.order_id);

        assert!(h.orders.find_by_reference("HMX9999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_before_any_supplier_call() {
        let h = harness(Options::default());
        let err = h.service.buy_cart(request(vec![])).await.unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(h.property.quotes.load(Ordering::SeqCst), 0);
        assert!(h.gateway.intents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_transaction_releases_every_reservation_made_so_far() {
        let h = harness(Options { fail_transaction_at: Some(2), ..Options::default() });
        let err = h.service.buy_cart(request(vec![stay_item(), stay_item()])).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Transaction { reservation_id: 88102, .. }));
        assert_eq!(*h.property.cancelled.lock().unwrap(), vec![88101, 88102]);
        assert!(h.orders.orders.lock().unwrap().is_empty());
        assert!(h.gateway.intents.lock().unwrap().is_empty());
        assert!(h.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn declined_intent_releases_reservations_and_stores_nothing() {
        let h = harness(Options { gateway_fails: true, ..Options::default() });
        let err = h.service.buy_cart(request(vec![stay_item()])).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Payment { .. }));
        assert_eq!(*h.property.cancelled.lock().unwrap(), vec![88101]);
        assert!(h.orders.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn tour_only_cart_never_touches_the_property_api() {
        let h = harness(Options::default());
        let outcome =
            h.service.buy_cart(request(vec![tour_item(), product_item()])).await.unwrap();

        assert_eq!(h.property.quotes.load(Ordering::SeqCst), 0);
        assert_eq!(h.property.reservations.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.amount_minor, 8990 + 3500);
        assert!(outcome.reservation_ids.is_empty());

        // With no accommodation share, the whole charge goes to the partner.
        let intents = h.gateway.intents.lock().unwrap();
        assert_eq!(intents[0].split.as_ref().unwrap().amount_minor, 12490);
    }

    #[tokio::test]
    async fn split_is_omitted_without_a_partner_account() {
        let h = harness(Options { no_partner: true, ..Options::default() });
        h.service.buy_cart(request(vec![stay_item(), tour_item()])).await.unwrap();

        let intents = h.gateway.intents.lock().unwrap();
        assert!(intents[0].split.is_none());
    }

    #[tokio::test]
    async fn confirmation_email_failure_does_not_sink_the_order() {
        let h = harness(Options { mailer_fails: true, ..Options::default() });
        let outcome = h.service.buy_cart(request(vec![stay_item()])).await.unwrap();

        assert_eq!(h.orders.orders.lock().unwrap().len(), 1);
        assert_eq!(outcome.amount_minor, 33000);
        assert!(h.property.cancelled.lock().unwrap().is_empty());
    }
}
