//! Barrido de recordatorios y retrasos
//!
//! Tarea de fondo que recorre las reservas confirmadas: avisa por correo
//! cuando el viaje arranca dentro de las próximas 24 horas y marca `Late`
//! (con notificación) las que ya pasaron su fecha de devolución.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::repositories::{BookingRepository, BookingSweepRow};
use crate::services::Mailer;

/// Ventana de aviso previa al inicio del viaje
const REMINDER_WINDOW_HOURS: i64 = 24;

/// Qué le toca a una reserva confirmada en este pase
#[derive(Debug, PartialEq, Eq)]
enum SweepAction {
    Remind { hours_left: i64 },
    MarkLate,
    Skip,
}

/// El recordatorio se repite en cada pase dentro de la ventana; no hay
/// marca de "ya avisado" en el modelo.
fn classify(
    now: DateTime<Utc>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> SweepAction {
    if end_date < now {
        return SweepAction::MarkLate;
    }

    let until_start = start_date - now;
    if until_start > Duration::zero() && until_start <= Duration::hours(REMINDER_WINDOW_HOURS) {
        // num_hours trunca hacia cero, y así sale en el mensaje
        return SweepAction::Remind {
            hours_left: until_start.num_hours(),
        };
    }

    SweepAction::Skip
}

pub struct BookingScheduler {
    bookings: BookingRepository,
    mailer: Arc<dyn Mailer>,
    interval_secs: u64,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Manija para apagar el barrido desde main
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SchedulerHandle {
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Lanza el barrido como tarea de fondo
pub fn spawn(pool: PgPool, mailer: Arc<dyn Mailer>, interval_secs: u64) -> SchedulerHandle {
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

    let scheduler = BookingScheduler {
        bookings: BookingRepository::new(pool),
        mailer,
        interval_secs,
        shutdown_rx,
    };
    tokio::spawn(scheduler.run());

    SchedulerHandle { shutdown_tx }
}

impl BookingScheduler {
    async fn run(mut self) {
        log::info!("⏰ Booking sweep running every {}s", self.interval_secs);

        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(self.interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep().await;
                }
                _ = self.shutdown_rx.recv() => {
                    log::info!("⏰ Booking sweep shutting down");
                    break;
                }
            }
        }
    }

    /// Un pase completo. Cada reserva se procesa aislada: un fallo se
    /// registra y el pase sigue con la siguiente.
    async fn sweep(&self) {
        let rows = match self.bookings.find_confirmed_with_users().await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("❌ Booking sweep query failed: {}", e);
                return;
            }
        };

        let now = Utc::now();
        for row in rows {
            match classify(now, row.start_date, row.end_date) {
                SweepAction::Remind { hours_left } => self.remind(&row, hours_left).await,
                SweepAction::MarkLate => self.mark_late(&row).await,
                SweepAction::Skip => {}
            }
        }
    }

    async fn remind(&self, row: &BookingSweepRow, hours_left: i64) {
        let body = format!(
            "Your booking with ID {} is about to start in {} hours.",
            row.id, hours_left
        );

        if let Err(e) = self
            .mailer
            .send_email(&row.user_email, "Booking Reminder", &body)
            .await
        {
            log::warn!("⚠️ Reminder for booking {} failed: {}", row.id, e);
        }
    }

    /// El correo sale antes de tocar el estado; si falla, la reserva sigue
    /// confirmada y el siguiente pase reintenta las dos cosas.
    async fn mark_late(&self, row: &BookingSweepRow) {
        let body = format!(
            "Your booking with ID {} is overdue. Please return the car immediately.",
            row.id
        );

        if let Err(e) = self
            .mailer
            .send_email(&row.user_email, "Late Notification", &body)
            .await
        {
            log::warn!("⚠️ Late notification for booking {} failed: {}", row.id, e);
            return;
        }

        match self.bookings.mark_late(row.id).await {
            Ok(true) => log::info!("⏰ Booking {} marked late", row.id),
            // Otra transición ganó la carrera; no hay nada que pisar
            Ok(false) => {}
            Err(e) => log::error!("❌ Marking booking {} late failed: {}", row.id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::models::booking::BookingStatus;
    use crate::models::car::{CarStatus, FuelType};
    use crate::repositories::{CarRepository, UserRepository};
    use crate::services::MockMailer;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 24, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_reminder_fires_inside_the_window() {
        let now = fixed_now();
        let start = now + Duration::hours(23);

        let action = classify(now, start, start + Duration::days(1));
        assert_eq!(action, SweepAction::Remind { hours_left: 23 });
    }

    #[test]
    fn test_exactly_24_hours_out_still_reminds() {
        let now = fixed_now();
        let start = now + Duration::hours(24);

        let action = classify(now, start, start + Duration::days(1));
        assert_eq!(action, SweepAction::Remind { hours_left: 24 });
    }

    #[test]
    fn test_25_hours_out_is_left_alone() {
        let now = fixed_now();
        let start = now + Duration::hours(25);

        let action = classify(now, start, start + Duration::days(1));
        assert_eq!(action, SweepAction::Skip);
    }

    #[test]
    fn test_fractional_hours_truncate_in_the_message() {
        let now = fixed_now();
        let start = now + Duration::minutes(90);

        let action = classify(now, start, start + Duration::days(1));
        assert_eq!(action, SweepAction::Remind { hours_left: 1 });
    }

    #[test]
    fn test_overdue_booking_goes_late() {
        let now = fixed_now();
        let end = now - Duration::hours(1);

        let action = classify(now, end - Duration::days(1), end);
        assert_eq!(action, SweepAction::MarkLate);
    }

    #[test]
    fn test_ride_in_progress_is_skipped() {
        let now = fixed_now();

        let action = classify(now, now - Duration::hours(1), now + Duration::hours(5));
        assert_eq!(action, SweepAction::Skip);
    }

    async fn test_pool() -> Option<PgPool> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                println!("DATABASE_URL no definido, test omitido");
                return None;
            }
        };

        let pool = PgPool::connect(&url).await.ok()?;
        sqlx::migrate!("./migrations").run(&pool).await.ok()?;
        Some(pool)
    }

    async fn seed_overdue_confirmed_booking(pool: &PgPool) -> Uuid {
        let user_id = Uuid::new_v4();
        let email = format!("{}@example.com", user_id.simple());
        let user = UserRepository::new(pool.clone())
            .ensure_from_identity(user_id, &email)
            .await
            .unwrap();

        let chassis = format!("CH{}", &Uuid::new_v4().simple().to_string()[..12]);
        let car = CarRepository::new(pool.clone())
            .create(
                user.id,
                "Baleno".to_string(),
                2020,
                FuelType::Diesel,
                "Nashik".to_string(),
                19.9975,
                73.7898,
                Decimal::new(1000, 2),
                Decimal::new(8000, 2),
                CarStatus::Available,
                chassis,
            )
            .await
            .unwrap();

        let start = Utc::now() - Duration::days(3);
        let booking: crate::models::booking::Booking = sqlx::query_as(
            r#"
            INSERT INTO bookings (user_id, car_id, start_date, end_date, estimated_distance, fare, status)
            VALUES ($1, $2, $3, $4, 80, 950.00, 'Confirmed')
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(car.id)
        .bind(start)
        .bind(start + Duration::days(1))
        .fetch_one(pool)
        .await
        .unwrap();

        booking.id
    }

    #[tokio::test]
    async fn sweep_notifies_and_marks_overdue_bookings_late() {
        let pool = match test_pool().await {
            Some(pool) => pool,
            None => return,
        };

        let booking_id = seed_overdue_confirmed_booking(&pool).await;

        let mock = Arc::new(MockMailer::new());
        let (_shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let scheduler = BookingScheduler {
            bookings: BookingRepository::new(pool.clone()),
            mailer: mock.clone(),
            interval_secs: 3600,
            shutdown_rx,
        };

        scheduler.sweep().await;

        let sent = mock.sent().await;
        let late_mail = sent
            .iter()
            .find(|mail| mail.body.contains(&booking_id.to_string()))
            .expect("late notification sent");
        assert_eq!(late_mail.subject, "Late Notification");
        assert!(late_mail.body.contains("is overdue"));

        let booking = BookingRepository::new(pool.clone())
            .find_by_id(booking_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Late);
    }
}
