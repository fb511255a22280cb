use crate::domain::checkout::Address;
use crate::domain::money::Money;
use crate::domain::payment::{
    PaymentAuthorityError, PaymentIntent, PaymentMetadata, TaxedPaymentIntent,
};
use crate::domain::ports::PaymentAuthority;
use crate::domain::pricing::TaxPolicy;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// A local stand-in for the hosted payments provider.
///
/// Computes tax with the injected `TaxPolicy` and issues intents with
/// provider-shaped ids and client secrets. Nothing is charged.
pub struct SimulatedPaymentAuthority {
    tax: Arc<dyn TaxPolicy>,
    currency: String,
}

impl SimulatedPaymentAuthority {
    pub fn new(tax: Arc<dyn TaxPolicy>, currency: impl Into<String>) -> Self {
        Self {
            tax,
            currency: currency.into().to_lowercase(),
        }
    }
}

#[async_trait]
impl PaymentAuthority for SimulatedPaymentAuthority {
    async fn create_payment_intent_with_tax(
        &self,
        amount: Money,
        destination: &Address,
        metadata: &PaymentMetadata,
    ) -> Result<TaxedPaymentIntent, PaymentAuthorityError> {
        if amount.is_zero() {
            return Err(PaymentAuthorityError::Rejected(
                "amount must be greater than zero".to_string(),
            ));
        }

        let tax_amount = self.tax.tax_for(amount, destination);
        let total = amount + tax_amount;
        let cents = i64::try_from(total.cents())
            .map_err(|_| PaymentAuthorityError::Rejected("amount out of range".to_string()))?;

        let id = format!("pi_{}", Uuid::new_v4().simple());
        let client_secret = format!("{id}_secret_{}", Uuid::new_v4().simple());
        debug!(%id, amount = cents, "simulated payment intent");

        let mut metadata = metadata.clone();
        metadata.insert("tax_amount".to_string(), tax_amount.to_string());

        Ok(TaxedPaymentIntent {
            payment_intent: PaymentIntent {
                id,
                client_secret,
                amount: cents,
                currency: self.currency.clone(),
                metadata,
            },
            tax_amount,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::FlatRateTax;
    use rust_decimal_macros::dec;

    fn address() -> Address {
        Address {
            name: "Ada".to_string(),
            line1: "1 Main St".to_string(),
            line2: None,
            city: "Springfield".to_string(),
            state: None,
            postal_code: "62701".to_string(),
            country: "US".to_string(),
        }
    }

    #[tokio::test]
    async fn test_simulated_intent_applies_tax() {
        let authority =
            SimulatedPaymentAuthority::new(Arc::new(FlatRateTax { rate: dec!(0.08) }), "USD");
        let taxed = authority
            .create_payment_intent_with_tax(
                Money::new(dec!(105)).unwrap(),
                &address(),
                &PaymentMetadata::new(),
            )
            .await
            .unwrap();

        assert_eq!(taxed.tax_amount, Money::new(dec!(8.40)).unwrap());
        assert_eq!(taxed.total, Money::new(dec!(113.40)).unwrap());
        assert_eq!(taxed.payment_intent.amount, 11340);
        assert_eq!(taxed.payment_intent.currency, "usd");
        assert_eq!(taxed.payment_intent.metadata["tax_amount"], "8.40");
        assert!(
            taxed
                .payment_intent
                .client_secret
                .starts_with(&format!("{}_secret_", taxed.payment_intent.id))
        );
    }

    #[tokio::test]
    async fn test_zero_amount_is_rejected() {
        let authority =
            SimulatedPaymentAuthority::new(Arc::new(FlatRateTax { rate: dec!(0) }), "usd");
        let result = authority
            .create_payment_intent_with_tax(Money::ZERO, &address(), &PaymentMetadata::new())
            .await;
        assert!(matches!(result, Err(PaymentAuthorityError::Rejected(_))));
    }
}
