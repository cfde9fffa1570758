//! Sample notification catalog.
//!
//! # Invariants
//! - Every synthesized sample has a fresh UUIDv4 id and starts unread.
//! - High priority is assigned with probability `HIGH_PRIORITY_PROBABILITY`.

use crate::model::notification::{ActionType, Notification, NotificationKind, Priority, Sender};
use rand::Rng;

const HIGH_PRIORITY_PROBABILITY: f64 = 0.3;

/// Static description of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTemplate {
    pub kind: NotificationKind,
    pub title: &'static str,
    pub message: &'static str,
    pub sender_name: &'static str,
    pub sender_avatar_url: &'static str,
    pub action_type: ActionType,
}

const DEFAULT_TEMPLATES: &[SampleTemplate] = &[
    SampleTemplate {
        kind: NotificationKind::Message,
        title: "New Message",
        message: "You have received a new message from John Doe.",
        sender_name: "John Doe",
        sender_avatar_url: "https://randomuser.me/api/portraits/men/1.jpg",
        action_type: ActionType::View,
    },
    SampleTemplate {
        kind: NotificationKind::Alert,
        title: "System Alert",
        message: "Your account password will expire soon.",
        sender_name: "System",
        sender_avatar_url: "",
        action_type: ActionType::Update,
    },
    SampleTemplate {
        kind: NotificationKind::Task,
        title: "Task Assigned",
        message: "You have been assigned a new task: Complete the report.",
        sender_name: "Manager",
        sender_avatar_url: "https://randomuser.me/api/portraits/women/2.jpg",
        action_type: ActionType::View,
    },
    SampleTemplate {
        kind: NotificationKind::Update,
        title: "App Update",
        message: "Version 2.0 is now available. Update now for new features!",
        sender_name: "App Team",
        sender_avatar_url: "",
        action_type: ActionType::Download,
    },
];

/// Fixed set of templates that `add_sample` draws from.
#[derive(Debug, Clone)]
pub struct SampleCatalog {
    templates: &'static [SampleTemplate],
}

impl Default for SampleCatalog {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES,
        }
    }
}

impl SampleCatalog {
    pub fn templates(&self) -> &'static [SampleTemplate] {
        self.templates
    }

    /// Synthesizes a sample from a random template.
    pub fn synthesize(&self, rng: &mut impl Rng) -> Notification {
        let template = self.templates[rng.gen_range(0..self.templates.len())];
        let mut notification = Notification::new(template.kind, template.title, template.message);
        notification.priority = Some(if rng.gen_bool(HIGH_PRIORITY_PROBABILITY) {
            Priority::High
        } else {
            Priority::Normal
        });
        notification.sender = Some(Sender::new(
            template.sender_name,
            Some(template.sender_avatar_url),
        ));
        notification.action_type = Some(template.action_type);
        notification
    }
}
