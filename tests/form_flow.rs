use stepform::{
    FormController, FormDefinition, FormSignal, ManualClock, MemoryStorage, QueryParams, Storage,
    SubmitError,
};

const NOW: u64 = 1_720_000_000_000;

const SIGNUP: &str = r#"
id: signup
config:
  auto_scroll: false
  prefill: true
  messages:
    required: "Needed"
steps:
  - title: Account
    fields:
      - id: email
        type: email
        validate: required email
        param: email
      - id: password
        type: password
        validate: required minLength:8
  - title: Plan
    fields:
      - id: plan-basic
        name: plan
        type: radio
        value: basic
        validate: required
      - id: plan-pro
        name: plan
        type: radio
        value: pro
      - id: newsletter
        type: checkbox
        value: "yes"
  - title: Details
    fields:
      - id: phone
        type: tel
        validate: phone
        errorMessage: "Phone looks wrong"
      - id: born
        type: date
        validate: date
"#;

fn controller(storage: &MemoryStorage, clock: &ManualClock) -> FormController {
    let definition = FormDefinition::from_yaml_str(SIGNUP).expect("definition");
    FormController::from_definition(
        definition,
        Box::new(storage.clone()),
        Box::new(clock.clone()),
    )
    .expect("controller")
}

#[test]
fn walks_through_and_submits() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(NOW);
    let mut form = controller(&storage, &clock);
    form.start(None);

    assert!(!form.next_step());
    assert_eq!(form.validation().error("email"), Some("Needed"));

    form.set_value("email", "ada@example.com").expect("email");
    form.set_value("password", "correct horse").expect("password");
    assert!(form.next_step());

    form.set_checked("plan-pro", true).expect("plan");
    assert!(form.next_step());
    assert!(form.navigation().is_last_step);

    form.set_value("phone", "12").expect("phone");
    assert!(matches!(form.submit(), Err(SubmitError::Invalid { .. })));
    assert_eq!(form.validation().error("phone"), Some("Phone looks wrong"));

    form.set_value("phone", "+1 (555) 123-4567").expect("phone");
    form.set_value("born", "1990-02-28").expect("born");
    form.drain_signals();
    form.submit().expect("submit");
    assert_eq!(form.drain_signals(), vec![FormSignal::FormValid]);
    assert!(storage.is_empty());
}

#[test]
fn progress_survives_a_reload_without_the_password() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(NOW);

    let mut first = controller(&storage, &clock);
    first.start(None);
    first.set_value("email", "ada@example.com").expect("email");
    first.set_value("password", "correct horse").expect("password");
    first.next_step();
    first.set_checked("plan-pro", true).expect("plan");
    first.set_checked("newsletter", true).expect("newsletter");
    clock.advance(1_000);
    assert!(first.tick());
    first.destroy();

    let saved = storage.get("wf-form-signup").expect("get").expect("snapshot");
    assert!(!saved.contains("correct horse"));

    clock.advance(60 * 60 * 1_000);
    let mut second = controller(&storage, &clock);
    second.start(None);

    // The password is never restored, so step 0 blocks the jump back.
    assert_eq!(second.current_step(), 0);
    let form = second.form();
    assert_eq!(form.field("email").expect("email").value, "ada@example.com");
    assert_eq!(form.field("password").expect("password").value, "");
    assert!(form.field("plan-pro").expect("pro").checked);
    assert!(!form.field("plan-basic").expect("basic").checked);
    assert!(form.field("newsletter").expect("newsletter").checked);
    assert!(matches!(
        second.drain_signals().first(),
        Some(FormSignal::ProgressRestored { timestamp }) if *timestamp == NOW + 1_000
    ));
}

#[test]
fn day_old_progress_is_dropped() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(NOW);

    let mut first = controller(&storage, &clock);
    first.set_value("email", "ada@example.com").expect("email");
    assert!(first.unload());

    clock.advance(25 * 60 * 60 * 1_000);
    let mut second = controller(&storage, &clock);
    second.start(None);
    assert_eq!(second.form().field("email").expect("email").value, "");
    assert!(storage.is_empty());
}

#[test]
fn query_prefills_and_selects_step() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(NOW);
    let mut form = controller(&storage, &clock);

    form.start(Some(&QueryParams::parse("?email=ada%40example.com&step=3")));
    assert_eq!(form.form().field("email").expect("email").value, "ada@example.com");
    // The password is still empty, so the jump stops on the first step.
    assert_eq!(form.current_step(), 0);
    assert!(form.validation().is_invalid("password"));
    assert!(!form.validation().is_invalid("email"));
}

#[test]
fn signals_serialize_for_the_view_layer() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(NOW);
    let mut form = controller(&storage, &clock);
    form.start(None);

    let json: Vec<String> = form
        .drain_signals()
        .iter()
        .map(|signal| serde_json::to_string(signal).expect("json"))
        .collect();
    assert_eq!(
        json,
        vec![
            r#"{"signal":"stepChanged","currentIndex":0,"totalSteps":3,"isFirstStep":true,"isLastStep":false}"#
        ]
    );
}
