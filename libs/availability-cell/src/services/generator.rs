use chrono::{Datelike, Duration as ChronoDuration, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::models::{AvailabilitySlot, AvailabilityError, CreateRecurringSlotsRequest};

/// Expands a recurring availability command into concrete slot rows.
pub struct SlotGenerator;

impl SlotGenerator {
    pub fn generate(
        request: &CreateRecurringSlotsRequest,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        let tz: Tz = request.time_zone.parse().map_err(|_| {
            AvailabilityError::InvalidRequest(format!("Invalid timezone: {}", request.time_zone))
        })?;

        let duration = ChronoDuration::minutes(request.slot_duration_minutes as i64);
        let now = Utc::now();
        let mut slots = Vec::new();

        let mut current_date = request.start_date;
        while current_date <= request.end_date {
            if request.days_of_week.contains(&current_date.weekday()) {
                let mut cursor = request.daily_start_time;
                loop {
                    let slot_end = cursor + duration;
                    if slot_end > request.daily_end_time || slot_end <= cursor {
                        break;
                    }

                    let start_time = resolve_local(&tz, current_date, cursor)?;
                    let end_time = resolve_local(&tz, current_date, slot_end)?;

                    slots.push(AvailabilitySlot {
                        id: Uuid::new_v4(),
                        provider_id: request.provider_id,
                        start_time,
                        end_time,
                        reserved: false,
                        reservation_token: None,
                        reserved_at: None,
                        version: 0,
                        created_at: now,
                        updated_at: now,
                    });

                    cursor = slot_end;
                    if cursor == request.daily_end_time {
                        break;
                    }
                }
            }
            current_date += ChronoDuration::days(1);
        }

        Ok(slots)
    }
}

fn resolve_local(
    tz: &Tz,
    date: chrono::NaiveDate,
    time: chrono::NaiveTime,
) -> Result<chrono::DateTime<Utc>, AvailabilityError> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|zoned| zoned.with_timezone(&Utc))
        .ok_or_else(|| {
            AvailabilityError::InvalidRequest(format!(
                "Local time {} {} does not exist in timezone {}",
                date, time, tz
            ))
        })
}
