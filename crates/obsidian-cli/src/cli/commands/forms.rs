//! Enquiry form command handlers.

use anyhow::Result;
use obsidian_core::forms::{BookingForm, CallbackForm, ContactForm, FormReceipt};

use crate::cli::app::App;

fn print_receipt(receipt: &FormReceipt) {
    println!("{}", receipt.message);
    if let Some(reference) = &receipt.booking_reference {
        println!("Reference: {reference}");
    }
}

pub async fn contact(app: &App, form: ContactForm) -> Result<()> {
    let receipt = form.submit(app.client()).await?;
    print_receipt(&receipt);
    Ok(())
}

pub async fn book(app: &App, form: BookingForm) -> Result<()> {
    let receipt = form.submit(app.client()).await?;
    print_receipt(&receipt);
    Ok(())
}

pub async fn callback(app: &App, form: CallbackForm) -> Result<()> {
    let receipt = form.submit(app.client()).await?;
    print_receipt(&receipt);
    Ok(())
}
