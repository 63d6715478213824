//! Templates registered with WhatsApp for this deployment.
//!
//! Ids must match the template names approved in the WhatsApp Business
//! account. Changing a body here without re-approving it upstream gets
//! the message rejected at delivery.

use crate::{Category, Template};

pub(crate) fn templates() -> Vec<Template> {
    vec![
        Template::new(
            "welcome_student",
            "Welcome",
            Category::Utility,
            "First contact after a student signs up on the portal.",
            "Hi {{1}}, welcome to Study With Pride! Your advisor will reach out \
             within 2 business days. Reply to this message any time with questions.",
            1,
        ),
        Template::new(
            "consultation_reminder",
            "Consultation reminder",
            Category::Utility,
            "Reminder for a booked consultation. Params: name, date, time.",
            "Hi {{1}}, this is a reminder of your consultation with Study With Pride \
             on {{2}} at {{3}}. Reply RESCHEDULE if you need a different time.",
            3,
        ),
        Template::new(
            "document_request",
            "Document request",
            Category::Utility,
            "Ask a student to upload a missing document. Params: name, document.",
            "Hi {{1}}, to continue your application we still need your {{2}}. \
             Please upload it in the student portal.",
            2,
        ),
        Template::new(
            "application_update",
            "Application update",
            Category::Utility,
            "Status change on an application. Params: name, program, status.",
            "Hi {{1}}, your application to {{2}} has a new status: {{3}}. \
             Log in to the student portal for details.",
            3,
        ),
        Template::new(
            "visa_ready",
            "Visa ready",
            Category::Utility,
            "Visa or permit is ready for pickup. Params: name, document type.",
            "Hello {{1}}, your {{2}} is ready! Your advisor will contact you \
             about next steps.",
            2,
        ),
        Template::new(
            "follow_up",
            "Lead follow-up",
            Category::Marketing,
            "Recruiter follow-up with a lead who hasn't booked yet. Params: name, recruiter.",
            "Hi {{1}}, it's {{2}} from Study With Pride. Do you have a few minutes \
             this week to talk about your plans to study abroad?",
            2,
        ),
        Template::new(
            "intake_open",
            "Intake open",
            Category::Marketing,
            "Announce an open intake. Params: name, intake, deadline.",
            "Hi {{1}}! Applications for the {{2}} intake are open until {{3}}. \
             Book a free consultation to get started.",
            3,
        ),
        Template::new(
            "verification_code",
            "Verification code",
            Category::Authentication,
            "One-time code for portal sign-in. Params: code.",
            "{{1}} is your Study With Pride verification code. Do not share it.",
            1,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::TemplateCatalog;

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let catalog = TemplateCatalog::builtin().expect("built-in templates must validate");

        assert_eq!(catalog.len(), 8);
    }

    #[test]
    fn test_builtin_ids_are_whatsapp_safe() {
        // WhatsApp template names: lowercase letters, digits, underscores.
        let catalog = TemplateCatalog::builtin().unwrap();

        for t in catalog.iter() {
            assert!(
                t.id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "bad template id {:?}",
                t.id
            );
        }
    }

    #[test]
    fn test_builtin_visa_ready_renders() {
        let catalog = TemplateCatalog::builtin().unwrap();

        let body = catalog.get("visa_ready").unwrap().render(&["Maria", "visa"]).unwrap();

        assert_eq!(
            body,
            "Hello Maria, your visa is ready! Your advisor will contact you about next steps."
        );
    }
}
