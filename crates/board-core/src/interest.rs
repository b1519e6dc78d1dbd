//! Interest registrations for the improvement programme

use crate::error::{BoardError, Result};
use crate::identity::Actor;
use crate::store::BackingStore;
use crate::types::{RegistrationId, VoterId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Role a participant volunteers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestRole {
    ProductSponsor,
    Hustler,
    Hipster,
    Hacker,
    Coach,
}

impl InterestRole {
    /// Roles open to participants
    pub const PARTICIPANT: [InterestRole; 4] = [
        InterestRole::ProductSponsor,
        InterestRole::Hustler,
        InterestRole::Hipster,
        InterestRole::Hacker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterestRole::ProductSponsor => "product_sponsor",
            InterestRole::Hustler => "hustler",
            InterestRole::Hipster => "hipster",
            InterestRole::Hacker => "hacker",
            InterestRole::Coach => "coach",
        }
    }

    /// Human-readable label used in exports
    pub fn label(&self) -> &'static str {
        match self {
            InterestRole::ProductSponsor => "Product Sponsor",
            InterestRole::Hustler => "Hustler (PM)",
            InterestRole::Hipster => "Hipster (Designer)",
            InterestRole::Hacker => "Hacker (Developer)",
            InterestRole::Coach => "Coach",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "product_sponsor" => Some(InterestRole::ProductSponsor),
            "hustler" => Some(InterestRole::Hustler),
            "hipster" => Some(InterestRole::Hipster),
            "hacker" => Some(InterestRole::Hacker),
            "coach" => Some(InterestRole::Coach),
            _ => None,
        }
    }
}

impl fmt::Display for InterestRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    Participant,
    Coach,
}

impl RegistrationType {
    pub fn label(&self) -> &'static str {
        match self {
            RegistrationType::Participant => "Participant",
            RegistrationType::Coach => "Coach",
        }
    }
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A stored registration; unique per (voter, registration type)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRegistration {
    pub id: RegistrationId,
    pub voter_id: VoterId,
    pub email: String,
    pub roles: Vec<InterestRole>,
    pub registration_type: RegistrationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InterestRegistration {
    /// Labels of the registered roles, in role order
    pub fn role_labels(&self) -> Vec<&'static str> {
        self.roles.iter().map(|r| r.label()).collect()
    }
}

/// Records registrations of interest
#[derive(Clone)]
pub struct InterestRegistry {
    store: Arc<dyn BackingStore>,
}

impl InterestRegistry {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }

    /// Register as a participant for one or more roles
    pub fn register_participant(
        &self,
        actor: &Actor,
        roles: &[InterestRole],
    ) -> Result<InterestRegistration> {
        let mut roles = roles.to_vec();
        roles.sort();
        roles.dedup();
        if roles.is_empty() {
            return Err(BoardError::Validation(
                "Select at least one role".to_string(),
            ));
        }
        if roles.contains(&InterestRole::Coach) {
            return Err(BoardError::Validation(
                "Coaches register separately".to_string(),
            ));
        }
        if self.find(&actor.voter_id, RegistrationType::Participant)?.is_some() {
            return Err(BoardError::Validation(
                "You have already registered your interest.".to_string(),
            ));
        }

        self.insert(actor, roles, RegistrationType::Participant, None)
    }

    /// Register as a coach, optionally naming a supervisor
    pub fn register_coach(
        &self,
        actor: &Actor,
        supervisor_email: Option<&str>,
    ) -> Result<InterestRegistration> {
        if self.find(&actor.voter_id, RegistrationType::Participant)?.is_some() {
            return Err(BoardError::Validation(
                "You have already registered as a participant and cannot also register as a Coach."
                    .to_string(),
            ));
        }
        if self.find(&actor.voter_id, RegistrationType::Coach)?.is_some() {
            return Err(BoardError::Validation(
                "You have already registered as a Coach.".to_string(),
            ));
        }

        let supervisor_email = supervisor_email
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.contains('@') {
                    Ok(s.to_lowercase())
                } else {
                    Err(BoardError::Validation(format!(
                        "'{}' is not a valid supervisor email",
                        s
                    )))
                }
            })
            .transpose()?;

        self.insert(
            actor,
            vec![InterestRole::Coach],
            RegistrationType::Coach,
            supervisor_email,
        )
    }

    /// All registrations, newest first
    pub fn list(&self) -> Result<Vec<InterestRegistration>> {
        let mut registrations = self.store.list_registrations()?;
        registrations.reverse();
        registrations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(registrations)
    }

    fn find(
        &self,
        voter_id: &VoterId,
        registration_type: RegistrationType,
    ) -> Result<Option<InterestRegistration>> {
        Ok(self
            .store
            .list_registrations()?
            .into_iter()
            .find(|r| &r.voter_id == voter_id && r.registration_type == registration_type))
    }

    fn insert(
        &self,
        actor: &Actor,
        roles: Vec<InterestRole>,
        registration_type: RegistrationType,
        supervisor_email: Option<String>,
    ) -> Result<InterestRegistration> {
        let registration = InterestRegistration {
            id: RegistrationId::new(),
            voter_id: actor.voter_id.clone(),
            email: actor.email.clone(),
            roles,
            registration_type,
            supervisor_email,
            created_at: Utc::now(),
        };
        self.store.insert_registration(&registration)?;
        info!(
            "Registered {} interest for {}",
            registration.registration_type, registration.voter_id
        );
        Ok(registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use pretty_assertions::assert_eq;

    fn registry() -> InterestRegistry {
        InterestRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_role_names_and_labels() {
        assert_eq!(InterestRole::from_name("product-sponsor"), Some(InterestRole::ProductSponsor));
        assert_eq!(InterestRole::from_name("HACKER"), Some(InterestRole::Hacker));
        assert_eq!(InterestRole::from_name("wizard"), None);
        assert_eq!(InterestRole::Hipster.label(), "Hipster (Designer)");
        assert_eq!(
            serde_json::to_string(&InterestRole::ProductSponsor).unwrap(),
            "\"product_sponsor\""
        );
    }

    #[test]
    fn test_register_participant() {
        let registry = registry();
        let jane = Actor::new("Jane@Example.com", "Jane");

        let registration = registry
            .register_participant(
                &jane,
                &[InterestRole::Hacker, InterestRole::Hustler, InterestRole::Hacker],
            )
            .unwrap();
        assert_eq!(registration.roles, vec![InterestRole::Hustler, InterestRole::Hacker]);
        assert_eq!(registration.email, "jane@example.com");
        assert_eq!(registration.registration_type, RegistrationType::Participant);

        let err = registry
            .register_participant(&jane, &[InterestRole::Hipster])
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
        assert_eq!(registry.list().unwrap().len(), 1);
    }

    #[test]
    fn test_participant_roles_validated() {
        let registry = registry();
        let jane = Actor::new("jane@example.com", "Jane");
        assert!(registry.register_participant(&jane, &[]).is_err());
        assert!(registry
            .register_participant(&jane, &[InterestRole::Coach])
            .is_err());
    }

    #[test]
    fn test_register_coach() {
        let registry = registry();
        let tom = Actor::new("tom@example.com", "Tom");

        let registration = registry
            .register_coach(&tom, Some(" Boss@Example.com "))
            .unwrap();
        assert_eq!(registration.roles, vec![InterestRole::Coach]);
        assert_eq!(registration.supervisor_email.as_deref(), Some("boss@example.com"));

        let err = registry.register_coach(&tom, None).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: You have already registered as a Coach.");
    }

    #[test]
    fn test_participant_cannot_become_coach() {
        let registry = registry();
        let jane = Actor::new("jane@example.com", "Jane");
        registry
            .register_participant(&jane, &[InterestRole::Hacker])
            .unwrap();
        assert!(registry.register_coach(&jane, None).is_err());
    }

    #[test]
    fn test_invalid_supervisor_email() {
        let registry = registry();
        let tom = Actor::new("tom@example.com", "Tom");
        assert!(registry.register_coach(&tom, Some("not-an-email")).is_err());
        assert!(registry.register_coach(&tom, Some("  ")).is_ok());
    }

    #[test]
    fn test_list_newest_first() {
        let registry = registry();
        registry
            .register_participant(&Actor::new("a@example.com", "A"), &[InterestRole::Hacker])
            .unwrap();
        registry
            .register_coach(&Actor::new("b@example.com", "B"), None)
            .unwrap();

        let emails: Vec<_> = registry.list().unwrap().into_iter().map(|r| r.email).collect();
        assert_eq!(emails, vec!["b@example.com", "a@example.com"]);
    }
}
