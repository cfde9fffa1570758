use notifycenter_core::{OnboardingField, OnboardingForm, OnboardingStep};

fn filled_account(form: &mut OnboardingForm) {
    form.set_field(OnboardingField::Username, "ada");
    form.set_field(OnboardingField::Email, "ada@example.com");
    form.set_field(OnboardingField::Password, "secret1");
}

#[test]
fn empty_account_step_reports_required_fields() {
    let mut form = OnboardingForm::new();
    assert!(!form.next());
    assert_eq!(form.step(), OnboardingStep::Account);
    assert_eq!(
        form.errors().get(&OnboardingField::Username),
        Some(&"Username is required")
    );
    assert_eq!(
        form.errors().get(&OnboardingField::Email),
        Some(&"Email is required")
    );
    assert_eq!(
        form.errors().get(&OnboardingField::Password),
        Some(&"Password is required")
    );
}

#[test]
fn account_step_checks_lengths_and_email_shape() {
    let mut form = OnboardingForm::new();
    form.set_field(OnboardingField::Username, "ab");
    form.set_field(OnboardingField::Email, "not-an-email");
    form.set_field(OnboardingField::Password, "12345");

    assert!(!form.next());
    assert_eq!(
        form.errors().get(&OnboardingField::Username),
        Some(&"Username must be at least 3 characters")
    );
    assert_eq!(
        form.errors().get(&OnboardingField::Email),
        Some(&"Please enter a valid email address")
    );
    assert_eq!(
        form.errors().get(&OnboardingField::Password),
        Some(&"Password must be at least 6 characters")
    );
}

#[test]
fn editing_a_field_clears_its_error() {
    let mut form = OnboardingForm::new();
    form.next();
    form.set_field(OnboardingField::Username, "ada");
    assert!(!form.errors().contains_key(&OnboardingField::Username));
    assert!(form.errors().contains_key(&OnboardingField::Email));
}

#[test]
fn full_flow_collects_data_and_resets() {
    let mut form = OnboardingForm::new();
    filled_account(&mut form);
    assert!(form.next());
    assert_eq!(form.step(), OnboardingStep::Profile);

    assert!(!form.next());
    assert!(form.errors().contains_key(&OnboardingField::Country));
    assert!(form.errors().contains_key(&OnboardingField::Gender));

    form.set_field(OnboardingField::Country, "NZ");
    form.set_field(OnboardingField::Gender, "female");
    assert!(form.next());
    assert_eq!(form.step(), OnboardingStep::Review);
    assert!(!form.next());

    let data = form.complete().unwrap();
    assert_eq!(data.account.username, "ada");
    assert_eq!(data.profile.country, "NZ");
    assert_eq!(form.step(), OnboardingStep::Account);
    assert!(form.data().account.username.is_empty());
}

#[test]
fn back_moves_one_step_and_clears_errors() {
    let mut form = OnboardingForm::new();
    form.back();
    assert_eq!(form.step(), OnboardingStep::Account);

    filled_account(&mut form);
    form.next();
    form.next();
    assert!(!form.errors().is_empty());

    form.back();
    assert_eq!(form.step(), OnboardingStep::Account);
    assert!(form.errors().is_empty());
    assert_eq!(form.data().account.username, "ada");
}

#[test]
fn complete_outside_review_is_rejected() {
    let mut form = OnboardingForm::new();
    let err = form.complete().unwrap_err();
    assert_eq!(err.0, OnboardingStep::Account);
    assert_eq!(OnboardingStep::Review.number(), 3);
}
