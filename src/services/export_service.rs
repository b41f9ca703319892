use crate::models::Booking;

pub const EXPORT_HEADER: &str =
    "id,user_id,car_id,start_date,end_date,status,fare,feedback,estimated_distance";

/// Serializa las reservas al CSV del volcado mensual, en el orden de
/// columnas que consumen los cierres contables.
pub fn bookings_to_csv(bookings: &[Booking]) -> String {
    let mut output = String::with_capacity(64 * (bookings.len() + 1));
    output.push_str(EXPORT_HEADER);
    output.push('\n');

    for booking in bookings {
        let fields = [
            booking.id.to_string(),
            booking.user_id.to_string(),
            booking.car_id.to_string(),
            booking.start_date.format("%Y-%m-%d").to_string(),
            booking.end_date.format("%Y-%m-%d").to_string(),
            booking.status.as_str().to_string(),
            booking.fare.to_string(),
            booking.feedback.clone().unwrap_or_default(),
            booking.estimated_distance.to_string(),
        ];

        let row: Vec<String> = fields.iter().map(|field| escape_field(field)).collect();
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
