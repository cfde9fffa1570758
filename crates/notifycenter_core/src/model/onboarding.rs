//! Multi-step onboarding form state.
//!
//! # Responsibility
//! - Hold account/profile input across the three form steps.
//! - Validate a step before allowing the user to advance.
//!
//! # Invariants
//! - `step` is always within `Account..=Review`.
//! - `complete()` only succeeds on the review step and resets the form.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const MIN_USERNAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 6;

/// Form step, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OnboardingStep {
    Account = 1,
    Profile = 2,
    Review = 3,
}

impl OnboardingStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    fn next(self) -> Self {
        match self {
            Self::Account => Self::Profile,
            Self::Profile | Self::Review => Self::Review,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Account | Self::Profile => Self::Account,
            Self::Review => Self::Profile,
        }
    }
}

/// Editable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OnboardingField {
    Username,
    Email,
    Password,
    Country,
    Gender,
}

/// Step 1 input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Step 2 input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub country: String,
    pub gender: String,
}

/// Collected form result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingData {
    pub account: AccountDetails,
    pub profile: ProfileDetails,
}

/// Returned by [`OnboardingForm::complete`] outside the review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotOnReviewStep(pub OnboardingStep);

/// Onboarding form state machine.
#[derive(Debug, Clone)]
pub struct OnboardingForm {
    step: OnboardingStep,
    data: OnboardingData,
    errors: BTreeMap<OnboardingField, &'static str>,
}

impl Default for OnboardingForm {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingForm {
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::Account,
            data: OnboardingData::default(),
            errors: BTreeMap::new(),
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn data(&self) -> &OnboardingData {
        &self.data
    }

    /// Current validation messages keyed by field.
    pub fn errors(&self) -> &BTreeMap<OnboardingField, &'static str> {
        &self.errors
    }

    /// Sets one field value and clears its pending error.
    pub fn set_field(&mut self, field: OnboardingField, value: impl Into<String>) {
        let value = value.into();
        match field {
            OnboardingField::Username => self.data.account.username = value,
            OnboardingField::Email => self.data.account.email = value,
            OnboardingField::Password => self.data.account.password = value,
            OnboardingField::Country => self.data.profile.country = value,
            OnboardingField::Gender => self.data.profile.gender = value,
        }
        self.errors.remove(&field);
    }

    /// Validates the current step and advances when it passes.
    ///
    /// Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        let errors = match self.step {
            OnboardingStep::Account => validate_account(&self.data.account),
            OnboardingStep::Profile => validate_profile(&self.data.profile),
            OnboardingStep::Review => return false,
        };
        let passed = errors.is_empty();
        self.errors = errors;
        if passed {
            self.step = self.step.next();
        }
        passed
    }

    /// Moves one step back and clears errors. No-op on the first step.
    pub fn back(&mut self) {
        if self.step == OnboardingStep::Account {
            return;
        }
        self.step = self.step.previous();
        self.errors.clear();
    }

    /// Finishes the form from the review step, returning the collected data
    /// and resetting to an empty first step.
    pub fn complete(&mut self) -> Result<OnboardingData, NotOnReviewStep> {
        if self.step != OnboardingStep::Review {
            return Err(NotOnReviewStep(self.step));
        }
        let data = std::mem::take(&mut self.data);
        *self = Self::new();
        Ok(data)
    }
}

fn validate_account(account: &AccountDetails) -> BTreeMap<OnboardingField, &'static str> {
    let mut errors = BTreeMap::new();

    if account.username.trim().is_empty() {
        errors.insert(OnboardingField::Username, "Username is required");
    } else if account.username.chars().count() < MIN_USERNAME_CHARS {
        errors.insert(
            OnboardingField::Username,
            "Username must be at least 3 characters",
        );
    }

    if account.email.trim().is_empty() {
        errors.insert(OnboardingField::Email, "Email is required");
    } else if !EMAIL_RE.is_match(&account.email) {
        errors.insert(OnboardingField::Email, "Please enter a valid email address");
    }

    if account.password.trim().is_empty() {
        errors.insert(OnboardingField::Password, "Password is required");
    } else if account.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.insert(
            OnboardingField::Password,
            "Password must be at least 6 characters",
        );
    }

    errors
}

fn validate_profile(profile: &ProfileDetails) -> BTreeMap<OnboardingField, &'static str> {
    let mut errors = BTreeMap::new();
    if profile.country.is_empty() {
        errors.insert(OnboardingField::Country, "Please select a country");
    }
    if profile.gender.is_empty() {
        errors.insert(OnboardingField::Gender, "Please select a gender");
    }
    errors
}
