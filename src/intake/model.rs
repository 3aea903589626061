//! Answer set and service catalog.

use serde::{Deserialize, Serialize};

/// A named field collected by the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Service,
    Email,
    Phone,
    Workplace,
    Role,
}

impl Field {
    /// Form field name used in the outbound submission.
    pub fn form_key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Service => "service",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Workplace => "workplace",
            Self::Role => "role",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.form_key())
    }
}

/// Accumulated answers. Each field is written at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workplace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AnswerSet {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Service => &mut self.service,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Workplace => &mut self.workplace,
            Field::Role => &mut self.role,
        }
    }

    /// Read a field.
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Name => &self.name,
            Field::Service => &self.service,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Workplace => &self.workplace,
            Field::Role => &self.role,
        };
        value.as_deref()
    }

    /// Record a value. Returns false, leaving the existing value in place,
    /// when the field was already set.
    pub fn record(&mut self, field: Field, value: impl Into<String>) -> bool {
        let slot = self.slot(field);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value.into());
        true
    }

    /// Package the answers as named string fields for the intake endpoint.
    ///
    /// Unset fields become empty strings. `_replyto` mirrors the email so the
    /// intake service can reply to the sender. `service` is only included
    /// when the category branch is offered.
    pub fn to_form_fields(&self, include_service: bool) -> FormFields {
        let value = |field: Field| self.get(field).unwrap_or_default().to_string();

        let mut fields = vec![("name", value(Field::Name))];
        if include_service {
            fields.push(("service", value(Field::Service)));
        }
        fields.push(("_replyto", value(Field::Email)));
        fields.push(("email", value(Field::Email)));
        fields.push(("phone", value(Field::Phone)));
        fields.push(("workplace", value(Field::Workplace)));
        fields.push(("role", value(Field::Role)));

        FormFields(fields)
    }
}

/// Ordered `(name, value)` pairs posted to the intake endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(pub Vec<(&'static str, String)>);

impl FormFields {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.0.iter().map(|(k, _)| *k).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, String)> {
        self.0.iter()
    }
}

/// A service category offered by the branch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceCategory {
    /// Identifier carried by the category button.
    pub id: &'static str,
    /// Human label recorded as the `service` answer.
    pub label: &'static str,
    /// Category-specific reply shown after selection.
    pub response: &'static str,
}

/// Categories offered by the service branch.
pub const SERVICE_CATALOG: &[ServiceCategory] = &[
    ServiceCategory {
        id: "ai-consulting",
        label: "AI Consulting",
        response: "Great choice. We help teams find where AI actually pays off and ship it.",
    },
    ServiceCategory {
        id: "web-development",
        label: "Web Development",
        response: "Nice. We build fast, accessible sites and web apps end to end.",
    },
    ServiceCategory {
        id: "automation",
        label: "Process Automation",
        response: "Love it. Let's find the repetitive work we can take off your plate.",
    },
    ServiceCategory {
        id: "other",
        label: "Something else",
        response: "No problem, we'll figure out the right fit together.",
    },
];

impl ServiceCategory {
    /// Find a category by its button identifier.
    pub fn lookup(id: &str) -> Option<&'static ServiceCategory> {
        SERVICE_CATALOG.iter().find(|c| c.id == id)
    }
}
