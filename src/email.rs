//! Best-effort invoice email for paid bookings. Failures are logged and never
//! fail the booking request.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;

#[derive(Clone)]
pub struct Mailer {
    transport: SmtpTransport,
    from: String,
}

#[derive(Debug, Clone)]
pub struct InvoiceData {
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub service_name: String,
    pub date: String,
    pub duration: i64,
    pub total_cost: f64,
    pub address: String,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Self {
        let transport = SmtpTransport::relay(&config.server)
            .map(|builder| {
                builder
                    .credentials(Credentials::new(
                        config.email.clone(),
                        config.password.clone(),
                    ))
                    .build()
            })
            .unwrap_or_else(|err| {
                log::warn!("SMTP relay setup failed, falling back to unencrypted: {err}");
                SmtpTransport::builder_dangerous(&config.server).build()
            });

        Mailer {
            transport,
            from: config.email.clone(),
        }
    }

    /// Sends the invoice on a blocking task; the caller never waits on SMTP.
    pub fn send_invoice(&self, invoice: InvoiceData) {
        let mailer = self.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(err) = mailer.send_invoice_blocking(&invoice) {
                log::warn!("Invoice email for booking {} failed: {err}", invoice.order_id);
            }
        });
    }

    fn send_invoice_blocking(
        &self,
        invoice: &InvoiceData,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let reference = invoice_reference(&invoice.order_id);
        let body = format!(
            "Dear {name},\n\n\
             Thank you for choosing Care.xyz. Your booking has been confirmed.\n\n\
             Order ID: #{reference}\n\
             Service: {service}\n\
             Service date: {date}\n\
             Duration: {duration} hours\n\
             Location: {address}\n\
             Amount: BDT {total}\n\n\
             Payment is completed. You can view your booking from your dashboard.\n",
            name = invoice.customer_name,
            service = invoice.service_name,
            date = invoice.date,
            duration = invoice.duration,
            address = invoice.address,
            total = invoice.total_cost,
        );

        let message = Message::builder()
            .from(format!("Care.xyz Support <{}>", self.from).parse()?)
            .to(invoice.customer_email.parse()?)
            .subject(format!("Booking Confirmed - Invoice #{reference}"))
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.transport.send(&message)?;
        log::info!("Invoice email sent for booking {}", invoice.order_id);
        Ok(())
    }
}

fn invoice_reference(order_id: &str) -> String {
    let tail: String = order_id
        .chars()
        .rev()
        .take(6)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    tail.to_uppercase()
}
