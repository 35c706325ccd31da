//! Submission checks
//!
//! Everything here runs before the write transaction opens, so a rejected
//! submission leaves no trace.

use super::manager::OrderError;
use crate::pricing::money::{to_decimal, to_f64};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, TextViolation,
    check_optional_text, check_required_text,
};
use rust_decimal::Decimal;
use shared::error::ErrorCode;
use shared::models::AddressCreate;
use shared::order::{AddressInput, Customer, CustomerInput, PaymentMethod, SubmitOrderRequest};

/// Upper bound for lines in one order
pub const MAX_ORDER_LINES: usize = 100;

/// Upper bound for the delivery fee
pub const MAX_DELIVERY_FEE: f64 = 1_000.0;

fn text_error(v: TextViolation) -> OrderError {
    OrderError::validation(ErrorCode::ValidationFailed, v.to_string())
}

/// Shape checks on the request, before pricing
pub fn validate_submission(req: &SubmitOrderRequest) -> Result<(), OrderError> {
    resolve_customer(&req.customer)?;

    match &req.delivery_address {
        None => {
            return Err(OrderError::validation(
                ErrorCode::AddressRequired,
                "A delivery address is required: pass an address id or a new address",
            ));
        }
        Some(AddressInput::Existing(id)) if *id <= 0 => {
            return Err(OrderError::validation(
                ErrorCode::ValidationFailed,
                format!("Invalid address id {id}"),
            ));
        }
        Some(AddressInput::Existing(_)) => {}
        Some(AddressInput::New(address)) => validate_new_address(address)?,
    }

    if req.items.is_empty() {
        return Err(OrderError::validation(
            ErrorCode::OrderEmpty,
            "Order must contain at least one item",
        ));
    }
    if req.items.len() > MAX_ORDER_LINES {
        return Err(OrderError::validation(
            ErrorCode::ValueOutOfRange,
            format!("Order has {} lines, max {MAX_ORDER_LINES}", req.items.len()),
        ));
    }
    for (index, item) in req.items.iter().enumerate() {
        check_optional_text(&item.note, &format!("items[{index}].note"), MAX_NOTE_LEN)
            .map_err(text_error)?;
    }

    if !req.delivery_fee.is_finite() || !(0.0..=MAX_DELIVERY_FEE).contains(&req.delivery_fee) {
        return Err(OrderError::validation(
            ErrorCode::ValueOutOfRange,
            format!(
                "deliveryFee must be between 0 and {MAX_DELIVERY_FEE}, got {}",
                req.delivery_fee
            ),
        ));
    }

    if req.payment_method != PaymentMethod::Cash
        && (req.cash_change_requested.is_some() || req.cash_change_for.is_some())
    {
        return Err(OrderError::validation(
            ErrorCode::CashChangeNotAllowed,
            "Cash change fields must be absent unless paying with CASH",
        ));
    }

    Ok(())
}

/// Customer identity: a registered user, or a guest name and phone
pub fn resolve_customer(input: &CustomerInput) -> Result<Customer, OrderError> {
    if let Some(user_id) = input.user_id {
        if user_id <= 0 {
            return Err(OrderError::validation(
                ErrorCode::ValidationFailed,
                format!("Invalid user id {user_id}"),
            ));
        }
        return Ok(Customer::User { user_id });
    }

    let name = input.guest_name.as_deref().map(str::trim).unwrap_or_default();
    let phone = input.guest_phone.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() || phone.is_empty() {
        return Err(OrderError::validation(
            ErrorCode::CustomerIdentityRequired,
            "Either a userId or a guest name and phone are required",
        ));
    }
    check_required_text(name, "guestName", MAX_NAME_LEN).map_err(text_error)?;
    check_required_text(phone, "guestPhone", MAX_SHORT_TEXT_LEN).map_err(text_error)?;

    Ok(Customer::Guest {
        guest_name: name.to_string(),
        guest_phone: phone.to_string(),
    })
}

fn validate_new_address(address: &AddressCreate) -> Result<(), OrderError> {
    check_required_text(&address.street, "street", MAX_ADDRESS_LEN).map_err(text_error)?;
    check_required_text(&address.number, "number", MAX_SHORT_TEXT_LEN).map_err(text_error)?;
    check_required_text(&address.neighborhood, "neighborhood", MAX_ADDRESS_LEN).map_err(text_error)?;
    check_required_text(&address.city, "city", MAX_ADDRESS_LEN).map_err(text_error)?;
    check_optional_text(&address.complement, "complement", MAX_ADDRESS_LEN).map_err(text_error)?;
    check_optional_text(&address.reference, "reference", MAX_ADDRESS_LEN).map_err(text_error)?;
    check_optional_text(&address.zip_code, "zipCode", MAX_SHORT_TEXT_LEN).map_err(text_error)?;
    Ok(())
}

/// Cash change rule, once the total is known
///
/// Returns the `(cash_change_requested, cash_change_for)` pair to store.
pub fn check_cash_change(
    method: PaymentMethod,
    requested: Option<bool>,
    change_for: Option<f64>,
    total: Decimal,
) -> Result<(bool, Option<f64>), OrderError> {
    if method != PaymentMethod::Cash {
        return Ok((false, None));
    }

    match (requested.unwrap_or(false), change_for) {
        (false, None) => Ok((false, None)),
        (false, Some(_)) => Err(OrderError::validation(
            ErrorCode::CashChangeNotAllowed,
            "cashChangeFor requires cashChangeRequested",
        )),
        (true, None) => Err(OrderError::validation(
            ErrorCode::CashChangeInsufficient,
            format!("cashChangeFor is required and must exceed the total of {:.2}", to_f64(total)),
        )),
        (true, Some(amount)) => {
            if !to_decimal(amount).is_some_and(|amount| amount > total) {
                return Err(OrderError::validation(
                    ErrorCode::CashChangeInsufficient,
                    format!(
                        "cashChangeFor ({amount:.2}) must exceed the order total of {:.2}",
                        to_f64(total)
                    ),
                ));
            }
            Ok((true, Some(amount)))
        }
    }
}
