//! Console layouts per surface

use serde::Serialize;

use crate::auth::session::Surface;

/// Data store entities the consoles operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Doctor,
    Patient,
    Appointment,
    Bill,
    Medicine,
    Prescription,
    MedicalRecord,
}

/// Whether a section sees every record or only the caller's own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    All,
    Own,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub entity: Entity,
    pub scope: Scope,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub surface: Surface,
    pub sections: Vec<Section>,
}

const fn section(title: &'static str, entity: Entity, scope: Scope) -> Section {
    Section {
        title,
        entity,
        scope,
    }
}

impl Dashboard {
    pub fn for_surface(surface: Surface) -> Self {
        let sections = match surface {
            Surface::AdminConsole => vec![
                section("Doctors", Entity::Doctor, Scope::All),
                section("Patients", Entity::Patient, Scope::All),
                section("Appointments", Entity::Appointment, Scope::All),
                section("Bills", Entity::Bill, Scope::All),
                section("Medications", Entity::Medicine, Scope::All),
                section("Prescriptions", Entity::Prescription, Scope::All),
                section("Medical Records", Entity::MedicalRecord, Scope::All),
            ],
            Surface::DoctorConsole { .. } => vec![
                section("My Appointments", Entity::Appointment, Scope::Own),
                section("Patient Records", Entity::MedicalRecord, Scope::Own),
                section("Prescriptions", Entity::Prescription, Scope::Own),
            ],
            Surface::PatientConsole { .. } => vec![
                section("My Appointments", Entity::Appointment, Scope::Own),
                section("Medical Records", Entity::MedicalRecord, Scope::Own),
                section("Bills", Entity::Bill, Scope::Own),
            ],
        };

        Self { surface, sections }
    }
}
