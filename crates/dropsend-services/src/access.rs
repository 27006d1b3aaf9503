use dropsend_core::models::{Recipient, Transfer};

/// A link may be used iff its transfer exists and is active, and the recipient (when the
/// link is a recipient link) is active too. Completion plays no part.
pub fn is_accessible(recipient: Option<&Recipient>, transfer: Option<&Transfer>) -> bool {
    match transfer {
        Some(transfer) => transfer.active && recipient.map_or(true, |r| r.active),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn transfer(active: bool) -> Transfer {
        Transfer {
            pk: 1,
            uuid: Uuid::new_v4(),
            email: "s@example.com".into(),
            object: "o".into(),
            message: "m".into(),
            original_filename: "f".into(),
            archive_filename: "a.zip".into(),
            archive_size: 1,
            complete: false,
            active,
            download_dates: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn recipient(active: bool, complete: bool) -> Recipient {
        Recipient {
            pk: 1,
            uuid: Uuid::new_v4(),
            email: "r@example.com".into(),
            transfer_pk: 1,
            complete,
            active,
            download_dates: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_gate() {
        assert!(!is_accessible(None, None));
        assert!(!is_accessible(Some(&recipient(true, false)), None));
        assert!(is_accessible(None, Some(&transfer(true))));
        assert!(!is_accessible(None, Some(&transfer(false))));
        assert!(is_accessible(Some(&recipient(true, false)), Some(&transfer(true))));
        assert!(!is_accessible(Some(&recipient(false, false)), Some(&transfer(true))));
        assert!(!is_accessible(Some(&recipient(true, false)), Some(&transfer(false))));
    }

    #[test]
    fn test_completion_does_not_matter() {
        assert!(is_accessible(Some(&recipient(true, true)), Some(&transfer(true))));
        assert!(!is_accessible(Some(&recipient(false, true)), Some(&transfer(true))));
    }
}
