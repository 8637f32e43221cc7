//! Checkout session command

use std::time::Instant;

use mes_domain::{CheckoutRequest, CheckoutSession, Result};

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

pub async fn create_checkout(
    ctx: &AppContext,
    request: CheckoutRequest,
) -> Result<CheckoutSession> {
    let command = "checkout::create_checkout";
    let start = Instant::now();

    let result = ctx.checkout_service.create_session(request).await;

    log_command_execution(command, start.elapsed(), result.as_ref().err());
    result
}
