use chrono::NaiveDate;
use eventdesk_reservation::{
    CSV_HEADER, ExportError, RosterQuery, Selection, SortKey, SortOrder, export_csv, filter,
    reservation_name, sort, sort_instant,
};
use eventdesk_shared::{Reservation, ReservationUser};
use temp_dir::TempDir;

fn reservation(id: &str, user: Option<ReservationUser>, date: Option<&str>) -> Reservation {
    Reservation {
        id: id.to_owned(),
        event_id: "e1".to_owned(),
        user_id: format!("user-{id}"),
        reservation_date: date.map(str::to_owned),
        reserved_at: None,
        created_at: None,
        updated_at: None,
        status: Default::default(),
        event: None,
        user,
    }
}

fn person(first: &str, last: &str, email: &str) -> Option<ReservationUser> {
    Some(ReservationUser {
        first_name: Some(first.to_owned()),
        last_name: Some(last.to_owned()),
        email: Some(email.to_owned()),
        ..Default::default()
    })
}

/// Deterministic mix of complete, partial and undated reservations.
fn roster(seed: u64, len: usize) -> Vec<Reservation> {
    const FIRST: [&str; 6] = ["Ana", "bruno", "Carla", "DIEGO", "Éva", ""];
    const LAST: [&str; 4] = ["Souza", "lima", "", "Ng"];
    const DATES: [Option<&str>; 6] = [
        Some("2025-03-01T10:00:00.000Z"),
        Some("2025-01-15T08:30:00Z"),
        None,
        Some("not a date"),
        Some("2024-12-31T23:59:59Z"),
        Some("2025-03-01T10:00:00.000Z"),
    ];

    let mut state = seed;
    let mut next = move |bound: usize| {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) as usize % bound
    };

    (0..len)
        .map(|index| {
            let user = match next(5) {
                0 => None,
                _ => {
                    let first = FIRST[next(FIRST.len())];
                    let last = LAST[next(LAST.len())];
                    let email = match next(3) {
                        0 => String::new(),
                        _ => format!("{}{index}@example.com", first.to_lowercase()),
                    };
                    person(first, last, &email)
                }
            };

            reservation(&format!("r{index}"), user, DATES[next(DATES.len())])
        })
        .collect()
}

#[test]
fn test_filter_returns_matching_subset() {
    let queries = ["", "an", "ANA", "example", "lima", "zzz", "é", "1@"];

    for seed in 0..20 {
        let reservations = roster(seed, 25);

        for query in queries {
            let view = filter(&reservations, query);
            let needle = query.to_lowercase();

            assert!(view.len() <= reservations.len());
            for item in &view {
                assert!(reservations.iter().any(|original| std::ptr::eq(original, *item)));

                let name = reservation_name(item).unwrap_or_default().to_lowercase();
                let email = item.email().unwrap_or_default().to_lowercase();
                assert!(
                    name.contains(&needle) || email.contains(&needle),
                    "{query} does not match {item:?}"
                );
            }
        }
    }
}

#[test]
fn test_filter_tolerates_missing_users() {
    let reservations = vec![reservation("r1", None, None)];

    assert_eq!(filter(&reservations, "").len(), 1);
    assert!(filter(&reservations, "ana").is_empty());
}

#[test]
fn test_date_ascending_is_ordered() {
    for seed in 0..20 {
        let reservations = roster(seed, 30);
        let mut view = reservations.iter().collect::<Vec<_>>();

        sort(&mut view, SortKey::Date, SortOrder::Asc);

        assert!(
            view.windows(2)
                .all(|pair| sort_instant(pair[0]) <= sort_instant(pair[1]))
        );
    }
}

#[test]
fn test_sort_is_stable_in_both_directions() {
    let reservations = vec![
        reservation("a", person("Ana", "", "a@x.io"), Some("2025-03-01T10:00:00Z")),
        reservation("b", person("Bia", "", "b@x.io"), None),
        reservation("c", person("Caio", "", "c@x.io"), Some("2025-03-01T10:00:00Z")),
        reservation("d", person("Duda", "", "d@x.io"), Some("garbage")),
    ];

    let ids = |order| {
        let mut view = reservations.iter().collect::<Vec<_>>();
        sort(&mut view, SortKey::Date, order);
        view.iter().map(|r| r.id.as_str()).collect::<Vec<_>>()
    };

    assert_eq!(ids(SortOrder::Asc), vec!["b", "d", "a", "c"]);
    assert_eq!(ids(SortOrder::Desc), vec!["a", "c", "b", "d"]);
}

#[test]
fn test_name_sort_ignores_case() {
    let reservations = vec![
        reservation("1", person("carla", "", ""), None),
        reservation("2", person("Ana", "", ""), None),
        reservation("3", person("Bruno", "", ""), None),
    ];
    let query = RosterQuery {
        search: String::new(),
        sort_key: SortKey::Name,
        sort_order: SortOrder::Asc,
    };

    let view = query.apply(&reservations);

    assert_eq!(
        view.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        vec!["2", "3", "1"]
    );
}

#[test]
fn test_select_all_twice_on_filtered_view() {
    let reservations = (0..8)
        .map(|index| {
            let first = if index < 5 { "Ana" } else { "Bruno" };
            reservation(&format!("r{index}"), person(first, "", ""), None)
        })
        .collect::<Vec<_>>();
    let view = filter(&reservations, "ana");
    assert_eq!(view.len(), 5);

    let mut selection = Selection::default();
    selection.toggle_all(&view);
    assert_eq!(selection.len(), 5);
    assert!(!selection.contains("r6"));

    selection.toggle_all(&view);
    assert!(selection.is_empty());
}

#[test]
fn test_select_all_completes_partial_selection() {
    let reservations = roster(7, 6);
    let view = reservations.iter().collect::<Vec<_>>();
    let mut selection = Selection::default();
    selection.toggle("r0");

    selection.toggle_all(&view);

    assert_eq!(selection.len(), 6);
}

#[test]
fn test_export_quotes_every_field() -> anyhow::Result<()> {
    let reservations = vec![
        reservation(
            "1",
            Some(ReservationUser {
                name: Some("Ana \"Nick\" Souza, Jr".to_owned()),
                email: Some("ana@example.com".to_owned()),
                ..Default::default()
            }),
            Some("2025-03-01T09:05:00.000Z"),
        ),
        reservation("2", None, None),
        reservation("3", person("", "", "bia@example.com"), Some("soon")),
    ];
    let view = reservations.iter().collect::<Vec<_>>();
    let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();

    let export = export_csv(&view, Some("Rust & Friends 2025!"), today)?;

    assert_eq!(export.file_name, "reservations-Rust---Friends-2025--2025-03-02.csv");
    assert_eq!(export.rows, 3);
    assert_eq!(
        export.content,
        format!(
            "{CSV_HEADER}\n\
             \"Ana \"\"Nick\"\" Souza, Jr\",\"ana@example.com\",\"01/03/2025 09:05\"\n\
             \"Name unavailable\",\"Email unavailable\",\"Date unavailable\"\n\
             \"bia\",\"bia@example.com\",\"Invalid date\"\n"
        )
    );

    let dir = TempDir::new()?;
    let path = export.write_to(dir.path())?;
    assert_eq!(std::fs::read_to_string(path)?, export.content);

    Ok(())
}

#[test]
fn test_export_of_nothing() {
    let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();

    assert!(matches!(
        export_csv(&[], None, today),
        Err(ExportError::Empty)
    ));
}

#[test]
fn test_export_file_name_without_event() {
    let today = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();

    assert_eq!(
        eventdesk_reservation::export_file_name(None, today),
        "reservations-event-2025-12-24.csv"
    );
}
