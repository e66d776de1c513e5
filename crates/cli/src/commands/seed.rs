use crate::commands::{with_store, CommandResult};
use orderdesk_db::{migrations, DemoDataset, VerificationResult};

pub fn run() -> CommandResult {
    with_store("seed", |pool| async move {
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seeded = DemoDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;
        if !verification.all_present {
            return Err(("seed_verification", verification_failure_message(&verification), 6u8));
        }

        Ok(format!(
            "demo dataset loaded: {} customers, {} orders",
            seeded.customers, seeded.orders
        ))
    })
}

fn verification_failure_message(verification: &VerificationResult) -> String {
    let failed_checks = verification.failed_checks();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use orderdesk_db::VerificationResult;

    use super::verification_failure_message;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let verification = VerificationResult {
            all_present: false,
            checks: vec![
                ("customers".to_string(), true),
                ("orders-for-customer-3".to_string(), false),
                ("orders-for-customer-9".to_string(), false),
            ],
        };

        assert_eq!(
            verification_failure_message(&verification),
            "Seed verification failed for checks: orders-for-customer-3, orders-for-customer-9"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        let verification = VerificationResult { all_present: false, checks: Vec::new() };

        assert_eq!(verification_failure_message(&verification), "Some seed data failed to load");
    }
}
