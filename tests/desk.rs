use triagedesk::{
    core::{
        desk::{DeskConfig, DeskError, TriageDesk},
        index::IndexError,
        queue::QueueError,
    },
    record::{PatientDraft, VisitStatus},
};

fn desk(queue_capacity: usize, index_capacity: usize) -> TriageDesk {
    TriageDesk::new(DeskConfig {
        queue_capacity,
        index_capacity,
        retire_on_treat: false,
    })
}

fn treat_all(desk: &mut TriageDesk) -> Vec<String> {
    std::iter::from_fn(|| desk.treat_next().unwrap())
        .map(|r| r.id)
        .collect()
}

#[test]
fn treats_by_rank_then_arrival() {
    let mut desk = TriageDesk::default();
    desk.admit(PatientDraft::new("A", 3, "")).unwrap();
    desk.admit(PatientDraft::new("B", 1, "")).unwrap();
    desk.admit(PatientDraft::new("C", 2, "")).unwrap();
    desk.admit(PatientDraft::new("D", 1, "")).unwrap();

    assert_eq!(treat_all(&mut desk), vec!["B", "D", "C", "A"]);
    assert_eq!(desk.treat_next(), Ok(None));
}

#[test]
fn admission_assigns_arrival_and_registers_record() {
    let mut desk = TriageDesk::default();
    let first = desk.admit(PatientDraft::new("A", 2, "fever")).unwrap();
    let second = desk.admit(PatientDraft::new("B", 4, "cut")).unwrap();
    assert_eq!((first.arrival, second.arrival), (0, 1));
    assert_eq!(first.previous, None);

    let rec = desk.lookup("A").unwrap().unwrap();
    assert_eq!((rec.rank, rec.arrival, rec.status), (2, 0, VisitStatus::Waiting));
    assert_eq!(rec.info, "fever");
    assert_eq!((desk.waiting(), desk.registered()), (2, 2));
}

#[test]
fn treated_patient_stays_in_index() {
    let mut desk = TriageDesk::default();
    desk.admit(PatientDraft::new("A", 2, "fever")).unwrap();

    let treated = desk.treat_next().unwrap().unwrap();
    assert_eq!(treated.status, VisitStatus::Treated);
    assert_eq!(desk.lookup("A").unwrap(), Some(treated));
    assert_eq!(desk.waiting(), 0);
}

#[test]
fn retire_on_treat_removes_record() {
    let mut desk = TriageDesk::new(DeskConfig {
        retire_on_treat: true,
        ..DeskConfig::default()
    });
    desk.admit(PatientDraft::new("A", 2, "fever")).unwrap();
    desk.treat_next().unwrap().unwrap();

    assert_eq!(desk.lookup("A").unwrap(), None);
    assert_eq!(desk.registered(), 0);
}

#[test]
fn peek_skips_nothing_live_and_keeps_order() {
    let mut desk = TriageDesk::default();
    assert_eq!(desk.peek_next(), Ok(None));
    desk.admit(PatientDraft::new("A", 2, "")).unwrap();
    desk.admit(PatientDraft::new("B", 1, "")).unwrap();

    assert_eq!(desk.peek_next().unwrap().unwrap().id, "B");
    assert_eq!(desk.peek_next().unwrap().unwrap().id, "B");
    assert_eq!(desk.waiting(), 2);
}

#[test]
fn readmitting_waiting_patient_retriages() {
    let mut desk = TriageDesk::default();
    desk.admit(PatientDraft::new("A", 5, "mild")).unwrap();
    desk.admit(PatientDraft::new("B", 3, "")).unwrap();

    let adm = desk.admit(PatientDraft::new("A", 1, "worse")).unwrap();
    assert_eq!(adm.previous, Some(VisitStatus::Waiting));
    assert_eq!((desk.waiting(), desk.queued_entries()), (2, 3));

    let first = desk.treat_next().unwrap().unwrap();
    assert_eq!((first.id.as_str(), first.rank, first.info.as_str()), ("A", 1, "worse"));
    assert_eq!(treat_all(&mut desk), vec!["B"]);
    assert_eq!(desk.queued_entries(), 0);
}

#[test]
fn readmitting_treated_patient_starts_new_visit() {
    let mut desk = TriageDesk::default();
    desk.admit(PatientDraft::new("A", 2, "")).unwrap();
    desk.treat_next().unwrap();

    let adm = desk.admit(PatientDraft::new("A", 4, "follow-up")).unwrap();
    assert_eq!(adm.previous, Some(VisitStatus::Treated));
    assert_eq!(treat_all(&mut desk), vec!["A"]);
}

#[test]
fn discharging_waiting_patient_drops_them_from_order() {
    let mut desk = TriageDesk::default();
    desk.admit(PatientDraft::new("A", 1, "")).unwrap();
    desk.admit(PatientDraft::new("B", 2, "")).unwrap();

    let gone = desk.discharge("A").unwrap().unwrap();
    assert_eq!(gone.id, "A");
    assert_eq!(desk.lookup("A"), Ok(None));
    assert_eq!(desk.discharge("A"), Ok(None));
    assert_eq!(desk.peek_next().unwrap().unwrap().id, "B");
    assert_eq!(treat_all(&mut desk), vec!["B"]);
}

#[test]
fn invalid_admissions_change_nothing() {
    let mut desk = TriageDesk::default();
    assert_eq!(
        desk.admit(PatientDraft::new("", 2, "")),
        Err(DeskError::InvalidId(String::new()))
    );
    assert_eq!(
        desk.admit(PatientDraft::new("A|B", 2, "")),
        Err(DeskError::InvalidId("A|B".to_string()))
    );
    assert_eq!(desk.admit(PatientDraft::new("A", 0, "")), Err(DeskError::InvalidRank(0)));
    assert_eq!(desk.admit(PatientDraft::new("A", 6, "")), Err(DeskError::InvalidRank(6)));
    assert_eq!((desk.queued_entries(), desk.registered()), (0, 0));
}

#[test]
fn full_queue_rejects_without_registering() {
    let mut desk = desk(2, 11);
    desk.admit(PatientDraft::new("A", 1, "")).unwrap();
    desk.admit(PatientDraft::new("B", 1, "")).unwrap();

    assert_eq!(
        desk.admit(PatientDraft::new("C", 1, "")),
        Err(DeskError::QueueFull(QueueError::Full { capacity: 2 }))
    );
    assert_eq!(desk.lookup("C"), Ok(None));
    assert_eq!(desk.registered(), 2);
}

#[test]
fn full_queue_makes_room_by_dropping_stale_entries() {
    let mut desk = desk(2, 11);
    desk.admit(PatientDraft::new("A", 3, "")).unwrap();
    desk.admit(PatientDraft::new("B", 3, "")).unwrap();
    desk.discharge("A").unwrap();

    desk.admit(PatientDraft::new("C", 1, "")).unwrap();
    assert_eq!(desk.queued_entries(), 2);
    assert_eq!(treat_all(&mut desk), vec!["C", "B"]);
}

#[test]
fn full_index_rejects_without_queueing() {
    let mut desk = desk(10, 2);
    desk.admit(PatientDraft::new("A", 1, "")).unwrap();
    desk.admit(PatientDraft::new("B", 1, "")).unwrap();

    assert_eq!(
        desk.admit(PatientDraft::new("C", 1, "")),
        Err(DeskError::TableFull(IndexError::Full { capacity: 2 }))
    );
    assert_eq!(desk.queued_entries(), 2);
    // Updating a registered id still works on a full index, and the
    // rejected admission did not consume an arrival number.
    assert_eq!(desk.admit(PatientDraft::new("A", 2, "")).unwrap().arrival, 2);
    assert_eq!(desk.waiting(), 2);
}

#[test]
fn snapshot_reports_counts_and_next() {
    let mut desk = desk(8, 7);
    desk.admit(PatientDraft::new("A", 4, "")).unwrap();
    desk.admit(PatientDraft::new("B", 2, "")).unwrap();
    desk.admit(PatientDraft::new("C", 1, "")).unwrap();
    desk.discharge("C").unwrap();

    let snap = desk.snapshot();
    assert_eq!(snap.waiting, 2);
    assert_eq!(snap.queued_entries, 3);
    assert_eq!((snap.queue_capacity, snap.index_capacity), (8, 7));
    assert_eq!((snap.registered, snap.tombstones), (2, 1));
    assert_eq!(snap.next.map(|r| r.id), Some("B".to_string()));
}
