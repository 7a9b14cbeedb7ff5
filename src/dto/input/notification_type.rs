use serde::{Deserialize, Serialize};
use strum::EnumString;

///
/// Tag describing what the notification is about.
///
/// Vocabulary is open-ended, so values this client does not know
/// are kept as [NotificationType::Unknown] instead of failing the whole batch.
///
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Deserialize, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    BountyApproved,
    PaymentReceived,
    ApplicationReceived,
    BountyCreated,
    #[strum(disabled)]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPresentation {
    pub glyph: &'static str,
    pub color: &'static str,
}

impl NotificationPresentation {
    pub const DEFAULT: Self = Self {
        glyph: "🔔",
        color: "text-gray-500",
    };
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::BountyApproved => "bounty_approved",
            Self::PaymentReceived => "payment_received",
            Self::ApplicationReceived => "application_received",
            Self::BountyCreated => "bounty_created",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn presentation(&self) -> NotificationPresentation {
        match self {
            Self::BountyApproved => NotificationPresentation {
                glyph: "✅",
                color: "text-green-500",
            },
            Self::PaymentReceived => NotificationPresentation {
                glyph: "💰",
                color: "text-yellow-500",
            },
            Self::ApplicationReceived => NotificationPresentation {
                glyph: "📝",
                color: "text-blue-500",
            },
            Self::BountyCreated => NotificationPresentation {
                glyph: "🎯",
                color: "text-purple-500",
            },
            Self::Unknown(_) => NotificationPresentation::DEFAULT,
        }
    }
}

impl From<String> for NotificationType {
    ///
    /// Values outside the known vocabulary become [NotificationType::Unknown]
    ///
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(notification_type) => notification_type,
            Err(_) => Self::Unknown(value),
        }
    }
}

impl From<NotificationType> for String {
    fn from(value: NotificationType) -> Self {
        match value {
            NotificationType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}
