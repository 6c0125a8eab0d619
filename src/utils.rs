//! Utility functions.

use rust_decimal::Decimal;

/// Wait for a process termination signal (Ctrl-C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Render a decimal list as `[a, b, c]`.
pub fn join_decimals(values: &[Decimal]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Render a decimal list as `[a, b, c]`, rounded to two places.
pub fn join_rounded(values: &[Decimal]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.round_dp(2).to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_lists_render_bracketed() {
        assert_eq!(join_decimals(&[dec!(40), dec!(12.5)]), "[40, 12.5]");
        assert_eq!(join_rounded(&[dec!(1.66667), dec!(2.5)]), "[1.67, 2.5]");
    }

    #[test]
    fn empty_list_renders_empty_brackets() {
        assert_eq!(join_decimals(&[]), "[]");
    }
}
