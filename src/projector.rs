//! Reminder projection for the calendar view.
//!
//! Pure functions only: given the live collection and an inclusive day
//! window, derive every occurrence (real or virtual) falling inside it,
//! grouped by calendar day. Nothing here mutates the store; the projection
//! is re-derived on every window change.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};

use crate::{Note, Reminder, Repeat};

/// Advances a timestamp by one recurrence step.
///
/// Monthly and yearly steps use calendar-month arithmetic, which clamps to
/// the last day of a shorter target month (Jan 31 + 1 month = Feb 29 in a
/// leap year) and keeps stepping from the clamped date. `None` only on
/// date overflow, which terminates expansion.
pub fn advance(when: DateTime<Utc>, repeat: Repeat) -> Option<DateTime<Utc>> {
    match repeat {
        Repeat::Daily => when.checked_add_days(Days::new(1)),
        Repeat::Weekly => when.checked_add_days(Days::new(7)),
        Repeat::Monthly => when.checked_add_months(Months::new(1)),
        Repeat::Yearly => when.checked_add_months(Months::new(12)),
    }
}

/// Computes every occurrence of a reminder falling within the inclusive
/// day window `[start, end]`.
///
/// Recurring reminders step forward from their anchor until the occurrence
/// day reaches `start`, then emit while it stays within `end`. There is no
/// backward expansion: an anchor already past `end` yields nothing. A
/// one-time reminder contributes its anchor if in-window, else nothing.
pub fn reminder_occurrences(
    reminder: &Reminder,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DateTime<Utc>> {
    let Some(repeat) = reminder.repeat else {
        let day = reminder.date.date_naive();
        if day >= start && day <= end {
            return vec![reminder.date];
        }
        return Vec::new();
    };

    let mut occurrences = Vec::new();
    let mut when = reminder.date;

    while when.date_naive() < start {
        match advance(when, repeat) {
            Some(next) => when = next,
            None => return occurrences,
        }
    }

    while when.date_naive() <= end {
        occurrences.push(when);
        match advance(when, repeat) {
            Some(next) => when = next,
            None => break,
        }
    }

    occurrences
}

/// Materializes the virtual note shown for a single reminder occurrence.
///
/// The id is synthesized from the source id plus the occurrence timestamp,
/// unique per occurrence. Recurring occurrences get the recurrence label
/// prefixed to the title; one-time occurrences keep the original title.
/// `createdAt` is replaced by the occurrence timestamp so the note lands
/// in the right calendar bucket.
pub fn occurrence_note(note: &Note, when: DateTime<Utc>) -> Note {
    let repeat = note.reminder.as_ref().and_then(|r| r.repeat);
    let title = match repeat {
        Some(repeat) => format!("[{}] {}", repeat.label(), note.title),
        None => note.title.clone(),
    };

    Note {
        id: format!("{}-{}", note.id, when.timestamp_millis()),
        title,
        created_at: when,
        ..note.clone()
    }
}

/// Projects the collection onto the inclusive day window `[start, end]`:
/// each non-archived note whose `createdAt` day is in-window appears under
/// that day, and every reminder occurrence appears as a virtual note under
/// its day. Archived notes contribute nothing.
pub fn project(notes: &[Note], start: NaiveDate, end: NaiveDate) -> BTreeMap<NaiveDate, Vec<Note>> {
    let mut days: BTreeMap<NaiveDate, Vec<Note>> = BTreeMap::new();

    for note in notes.iter().filter(|n| !n.is_archived) {
        let created = note.created_at.date_naive();
        if created >= start && created <= end {
            days.entry(created).or_default().push(note.clone());
        }

        if let Some(reminder) = &note.reminder {
            for when in reminder_occurrences(reminder, start, end) {
                days.entry(when.date_naive())
                    .or_default()
                    .push(occurrence_note(note, when));
            }
        }
    }

    days
}

/// The Monday-based week containing `date`, as an inclusive day range.
pub fn week_of(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
    (start, start + Days::new(6))
}

/// The first occurrence of a reminder strictly after `after`; the input
/// the notification collaborator schedules its one-shot alert at.
pub fn next_occurrence(reminder: &Reminder, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let Some(repeat) = reminder.repeat else {
        return (reminder.date > after).then_some(reminder.date);
    };

    let mut when = reminder.date;
    while when <= after {
        when = advance(when, repeat)?;
    }
    Some(when)
}
