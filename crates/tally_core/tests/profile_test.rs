use tally_core::Profile;

#[test]
fn parses_counter_suffix() {
    let profile = Profile::parse("Night Owl (yesterday: 12 / today: 4)");
    assert_eq!(profile.name, "Night Owl");
    assert_eq!(profile.yesterday, 12);
    assert_eq!(profile.today, 4);
}

#[test]
fn missing_suffix_starts_from_zero() {
    let profile = Profile::parse("  Night Owl ");
    assert_eq!(profile.name, "Night Owl");
    assert_eq!(profile.yesterday, 0);
    assert_eq!(profile.today, 0);
}

#[test]
fn display_name_round_trips() {
    let profile = Profile {
        name: "Owl (nocturnal)".to_string(),
        yesterday: 1,
        today: 2,
    };
    assert_eq!(Profile::parse(&profile.display_name()), profile);
}

#[test]
fn roll_over_moves_today_to_yesterday() {
    let mut profile = Profile::parse("Owl (yesterday: 5 / today: 7)");
    profile.roll_over();
    assert_eq!(profile.yesterday, 7);
    assert_eq!(profile.today, 0);
}
