//! Payment, storage-fee and status calculations
//!
//! Pure functions over line item / transaction data. Arithmetic is done in
//! `Decimal` and converted back to `f64` (2 dp) at the edges, the same way
//! order totals are handled elsewhere.
//!
//! Storage policy: once a customer has been notified that a pair is ready
//! (`pickup_notice`), they get an allowance window (10 days by default).
//! Every day past the window costs [`STORAGE_FEE_PER_DAY`]. A pair with no
//! recorded notice is treated as within allowance.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{LineItem, PaymentStatus, Transaction};


/// Default pickup allowance in days
pub const DEFAULT_ALLOWANCE_DAYS: i64 = 10;

/// Storage fee charged per day past the allowance
pub const STORAGE_FEE_PER_DAY: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

const DECIMAL_PLACES: u32 = 2;
const SECONDS_PER_DAY: i64 = 86_400;

/// Convert f64 to Decimal; non-finite input counts as zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Whole days between `notice` and `now`, floored (a notice 36 hours ago is 1 day)
pub fn days_elapsed(notice: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - notice).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Days left before storage fees start; negative once overdue
///
/// `None` notice returns `allowance_days` unchanged.
pub fn compute_pickup_allowance_at(
    notice: Option<DateTime<Utc>>,
    allowance_days: i64,
    now: DateTime<Utc>,
) -> i64 {
    match notice {
        Some(notice) => allowance_days - days_elapsed(notice, now),
        None => allowance_days,
    }
}

/// [`compute_pickup_allowance_at`] against the current time
pub fn compute_pickup_allowance(notice: Option<DateTime<Utc>>, allowance_days: i64) -> i64 {
    compute_pickup_allowance_at(notice, allowance_days, Utc::now())
}

/// Days past the allowance window, never negative
pub fn exceeded_days(notice: Option<DateTime<Utc>>, allowance_days: i64, now: DateTime<Utc>) -> i64 {
    (-compute_pickup_allowance_at(notice, allowance_days, now)).max(0)
}

/// Storage fee the item has accrued in total (recorded fee ignored)
pub fn accrued_storage_fee(item: &LineItem, now: DateTime<Utc>) -> Decimal {
    Decimal::from(exceeded_days(item.pickup_notice, DEFAULT_ALLOWANCE_DAYS, now)) * STORAGE_FEE_PER_DAY
}

/// Fee still to be charged on top of what is already recorded on the item
pub fn incremental_storage_fee(item: &LineItem, now: DateTime<Utc>) -> Decimal {
    (accrued_storage_fee(item, now) - to_decimal(item.storage_fee)).max(Decimal::ZERO)
}

/// Sum of positive storage-fee increments across `items`
///
/// Items whose recorded fee already covers (or exceeds) the accrued fee
/// contribute nothing; they are not netted against other items.
pub fn compute_storage_fee_from_line_items_at(items: &[LineItem], now: DateTime<Utc>) -> f64 {
    let total: Decimal = items
        .iter()
        .map(|item| incremental_storage_fee(item, now))
        .filter(|fee| fee.is_sign_positive() && !fee.is_zero())
        .sum();
    to_f64(total)
}

/// [`compute_storage_fee_from_line_items_at`] against the current time
pub fn compute_storage_fee_from_line_items(items: &[LineItem]) -> f64 {
    compute_storage_fee_from_line_items_at(items, Utc::now())
}

/// Payment status after paying `due_now` on top of `prev_paid`
pub fn get_updated_status(prev_paid: f64, due_now: f64, total: f64, storage_fee: f64) -> PaymentStatus {
    let paid = to_decimal(prev_paid) + to_decimal(due_now);
    let owed = to_decimal(total) + to_decimal(storage_fee);

    if paid.is_zero() {
        PaymentStatus::NotPaid
    } else if paid >= owed {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Partial
    }
}

/// Remaining balance, floored at zero
pub fn compute_updated_balance(total: f64, amount_paid: f64, storage_fee: f64) -> f64 {
    let balance = to_decimal(total) - to_decimal(amount_paid) + to_decimal(storage_fee);
    to_f64(balance.max(Decimal::ZERO))
}

/// Items whose allowance has run out
pub fn overdue_line_items(items: &[LineItem], now: DateTime<Utc>) -> Vec<&LineItem> {
    items
        .iter()
        .filter(|item| !item.current_status.is_picked_up())
        .filter(|item| exceeded_days(item.pickup_notice, DEFAULT_ALLOWANCE_DAYS, now) > 0)
        .collect()
}

/// New storage fee to record on one line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemFee {
    /// Line item `_id`
    pub id: String,
    pub storage_fee: f64,
}

/// Outcome of recording a payment against a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettlement {
    /// Total storage fee owed on the transaction (recorded + new)
    pub storage_fee: f64,
    /// Storage fee added by this settlement
    pub storage_fee_increment: f64,
    /// Running total paid, including this payment
    pub amount_paid: f64,
    pub balance: f64,
    pub status: PaymentStatus,
    /// Line items whose recorded fee must be raised
    pub line_item_fees: Vec<LineItemFee>,
}

/// Combine the calculators for a payment of `amount_due_now`
///
/// Only items belonging to the transaction that have not been picked up are
/// charged storage. A zero payment is allowed (it just refreshes fees and
/// status); paying into a settled transaction is rejected.
pub fn settle_payment(
    transaction: &Transaction,
    line_items: &[LineItem],
    amount_due_now: f64,
    now: DateTime<Utc>,
) -> AppResult<PaymentSettlement> {
    if !amount_due_now.is_finite() || amount_due_now < 0.0 {
        return Err(AppError::invalid_amount("amount_due_now", amount_due_now));
    }

    let mut chargeable = Vec::new();
    for item in line_items {
        if item.transaction_id != transaction.transaction_id {
            return Err(AppError::with_message(
                ErrorCode::LineItemMismatch,
                format!(
                    "Line item {} belongs to {}, not {}",
                    item.line_item_id, item.transaction_id, transaction.transaction_id
                ),
            ));
        }
        if !item.current_status.is_picked_up() {
            chargeable.push(item.clone());
        }
    }

    let recorded: Decimal = line_items.iter().map(|i| to_decimal(i.storage_fee)).sum();
    let increment = compute_storage_fee_from_line_items_at(&chargeable, now);
    let storage_fee = to_f64(recorded + to_decimal(increment));

    let outstanding =
        compute_updated_balance(transaction.total_amount, transaction.amount_paid, storage_fee);
    if outstanding == 0.0 && amount_due_now > 0.0 {
        return Err(AppError::new(ErrorCode::PaymentAlreadySettled)
            .with_detail("transaction_id", transaction.transaction_id.clone()));
    }

    let amount_paid = to_f64(to_decimal(transaction.amount_paid) + to_decimal(amount_due_now));
    let balance = compute_updated_balance(transaction.total_amount, amount_paid, storage_fee);
    let status = get_updated_status(
        transaction.amount_paid,
        amount_due_now,
        transaction.total_amount,
        storage_fee,
    );

    let line_item_fees = chargeable
        .iter()
        .filter(|item| !incremental_storage_fee(item, now).is_zero())
        .map(|item| LineItemFee {
            id: item.id.clone(),
            storage_fee: to_f64(accrued_storage_fee(item, now)),
        })
        .collect();

    tracing::debug!(
        transaction_id = %transaction.transaction_id,
        amount_due_now,
        storage_fee,
        balance,
        status = %status,
        "Payment settled"
    );

    Ok(PaymentSettlement {
        storage_fee,
        storage_fee_increment: increment,
        amount_paid,
        balance,
        status,
        line_item_fees,
    })
}
