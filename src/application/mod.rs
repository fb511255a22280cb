//! Application layer: the checkout pipeline and the order polling loop.
//!
//! `CartValidator` and `CheckoutIntentBuilder` run once per checkout
//! request. `OrderPollingMachine` and its tokio driver `OrderPoller` locate
//! the order after the customer returns from the payment page.

pub mod cart_validator;
pub mod checkout;
pub mod order_poller;
pub mod order_polling;
