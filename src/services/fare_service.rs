use crate::models::Car;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Horas facturables de la ventana del viaje; toda hora empezada se cobra
/// completa. Una ventana vacía (inicio == fin) no factura tiempo.
fn billable_hours(start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> i64 {
    let seconds = (end_date - start_date).num_seconds();
    (seconds + 3599) / 3600
}

/// Tarifa de la reserva: distancia estimada por la tarifa por kilómetro más
/// las horas facturables por la tarifa por hora del coche.
pub fn calculate_booking_fare(
    car: &Car,
    estimated_distance: i32,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Decimal {
    let distance_cost = Decimal::from(estimated_distance) * car.price_per_km;
    let time_cost = Decimal::from(billable_hours(start_date, end_date)) * car.price_per_hr;

    distance_cost + time_cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CarStatus, FuelType};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn car_with_rates(price_per_km: Decimal, price_per_hr: Decimal) -> Car {
        Car {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            model: "Swift".to_string(),
            year: 2020,
            fuel_type: FuelType::Petrol,
            city: "Pune".to_string(),
            latitude: 18.5204,
            longitude: 73.8567,
            price_per_km,
            price_per_hr,
            status: CarStatus::Available,
            chassis_number: "CH1234567".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn distance_and_whole_hours_add_up() {
        let car = car_with_rates(Decimal::from(10), Decimal::from(20));
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap();

        assert_eq!(
            calculate_booking_fare(&car, 100, start, end),
            Decimal::from(1080)
        );
    }

    #[test]
    fn started_hours_bill_in_full() {
        let car = car_with_rates(Decimal::from(10), Decimal::from(20));
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 11, 30, 0).unwrap();

        // 1.5h se cobran como 2h
        assert_eq!(
            calculate_booking_fare(&car, 50, start, end),
            Decimal::from(540)
        );
    }

    #[test]
    fn empty_trip_costs_nothing() {
        let car = car_with_rates(Decimal::from(10), Decimal::from(20));
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        assert_eq!(
            calculate_booking_fare(&car, 0, start, start),
            Decimal::ZERO
        );
    }

    #[test]
    fn billable_hours_round_up() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        assert_eq!(billable_hours(start, start), 0);
        assert_eq!(billable_hours(start, start + chrono::Duration::seconds(1)), 1);
        assert_eq!(billable_hours(start, start + chrono::Duration::hours(24)), 24);
        assert_eq!(
            billable_hours(start, start + chrono::Duration::minutes(90)),
            2
        );
    }

    #[test]
    fn fractional_rates_keep_decimal_precision() {
        let car = car_with_rates(Decimal::new(1250, 2), Decimal::new(4575, 2));
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap();

        // 80 * 12.50 + 3 * 45.75 = 1000.00 + 137.25
        assert_eq!(
            calculate_booking_fare(&car, 80, start, end),
            Decimal::new(113_725, 2)
        );
    }
}
