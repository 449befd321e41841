// HTML bodies for booking emails

use rust_decimal::Decimal;

use crate::payments::CompletedCheckout;

/// Escape `& < > "` for interpolation into HTML
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Everything the booking emails show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSummary {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub room: String,
    pub check_in: String,
    pub check_out: String,
    pub nights: String,
    pub guests: String,
    pub amount: Decimal,
}

impl BookingSummary {
    pub fn from_checkout(checkout: &CompletedCheckout) -> Self {
        let metadata = &checkout.metadata;
        Self {
            name: metadata.name.clone(),
            email: checkout.customer_email.clone().unwrap_or_default(),
            phone: metadata.phone.clone(),
            room: metadata.room_id.clone(),
            check_in: metadata.check_in.clone(),
            check_out: metadata.check_out.clone(),
            nights: metadata.nights.clone(),
            guests: metadata.guests.clone(),
            amount: checkout
                .amount_total_cents
                .map(|cents| Decimal::new(cents, 2))
                .unwrap_or(Decimal::ZERO),
        }
    }

    /// Fixed booking used by the admin test email
    pub fn sample() -> Self {
        Self {
            name: "Test Ospite".to_string(),
            email: "test@example.com".to_string(),
            phone: "+39 333 1234567".to_string(),
            room: "sun".to_string(),
            check_in: "2026-03-01".to_string(),
            check_out: "2026-03-03".to_string(),
            nights: "2".to_string(),
            guests: "2".to_string(),
            amount: Decimal::new(150, 0),
        }
    }

    fn room_label(&self) -> String {
        self.room.to_uppercase()
    }

    fn amount_label(&self) -> String {
        format!("{:.2}", self.amount.round_dp(2))
    }

    fn phone_label(&self) -> String {
        let phone = escape_html(self.phone.trim());
        if phone.is_empty() {
            "—".to_string()
        } else {
            phone
        }
    }
}

/// Subject and body of the notification sent to the B&B
pub fn internal_notification(summary: &BookingSummary, test: bool) -> (String, String) {
    let subject = format!(
        "{}Nuova prenotazione online – {} – Camera {}",
        if test { "[TEST] " } else { "" },
        summary.name,
        summary.room_label()
    );
    let footer = if test {
        "Questa è un'email di TEST (nessun pagamento reale)."
    } else {
        "Questa email è stata inviata automaticamente dopo il pagamento su Stripe."
    };
    let html = format!(
        r#"<h2>Nuova prenotazione ricevuta dal sito</h2>
<p><strong>Ospite:</strong> {name}</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Telefono:</strong> {phone}</p>
<p><strong>Camera:</strong> {room}</p>
<p><strong>Arrivo:</strong> {check_in}</p>
<p><strong>Partenza:</strong> {check_out}</p>
<p><strong>Notti:</strong> {nights}</p>
<p><strong>Ospiti:</strong> {guests}</p>
<p><strong>Importo pagato:</strong> € {amount}</p>
<p style="margin-top: 20px; color: #666; font-size: 12px;">{footer}</p>
"#,
        name = escape_html(&summary.name),
        email = escape_html(&summary.email),
        phone = summary.phone_label(),
        room = escape_html(&summary.room_label()),
        check_in = escape_html(&summary.check_in),
        check_out = escape_html(&summary.check_out),
        nights = escape_html(&summary.nights),
        guests = escape_html(&summary.guests),
        amount = summary.amount_label(),
        footer = footer,
    );
    (subject, html)
}

/// Subject and body of the confirmation sent to the guest
pub fn guest_confirmation(
    summary: &BookingSummary,
    contact_email: &str,
    contact_phone: &str,
) -> (String, String) {
    let subject = "Conferma prenotazione – Ohana B&B".to_string();
    let contact_email = escape_html(contact_email);
    let html = format!(
        r#"<h2>Grazie per la tua prenotazione!</h2>
<p>Ciao {name},</p>
<p>La tua prenotazione è stata confermata. Ecco il riepilogo:</p>
<ul>
  <li><strong>Camera:</strong> {room}</li>
  <li><strong>Check-in:</strong> {check_in}</li>
  <li><strong>Check-out:</strong> {check_out}</li>
  <li><strong>Notti:</strong> {nights}</li>
  <li><strong>Ospiti:</strong> {guests}</li>
  <li><strong>Importo pagato:</strong> € {amount}</li>
</ul>
<p>Per modifiche o informazioni puoi contattarci:</p>
<p>Email: <a href="mailto:{contact_email}">{contact_email}</a><br>
Telefono: {contact_phone}</p>
<p>A presto,<br><strong>Ohana B&amp;B</strong></p>
"#,
        name = escape_html(&summary.name),
        room = escape_html(&summary.room_label()),
        check_in = escape_html(&summary.check_in),
        check_out = escape_html(&summary.check_out),
        nights = escape_html(&summary.nights),
        guests = escape_html(&summary.guests),
        amount = summary.amount_label(),
        contact_email = contact_email,
        contact_phone = escape_html(contact_phone),
    );
    (subject, html)
}
