//! Dashboard
//!
//! Tarjetas de resumen de todas las colecciones. Cada colección se pide en
//! paralelo; un fallo de cualquiera falla el dashboard entero.

use serde::Serialize;

use crate::listview::{ListViewController, Summary, ViewContext};
use crate::models::{
    Accident, Collection, Document, Driver, Entity, FuelLog, License, Role, Service, Tyre, User,
    Vehicle,
};
use crate::state::AppState;
use crate::utils::errors::AppResult;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCard {
    pub collection: Collection,
    pub label: &'static str,
    pub summary: Summary,
}

/// Resumen de una colección completa, sin filtros. Las tarjetas sobre
/// columnas ocultas al rol no se incluyen.
pub async fn card<E: Entity>(state: &AppState, role: Role) -> AppResult<DashboardCard> {
    let records = state.repository::<E>().list().await?;
    let mut controller = ListViewController::new(E::list_config(), ViewContext::new(role));
    controller.data_loaded(records);
    Ok(DashboardCard {
        collection: E::COLLECTION,
        label: E::COLLECTION.label(),
        summary: controller.view().summary,
    })
}

pub async fn dashboard(state: &AppState, role: Role) -> AppResult<Vec<DashboardCard>> {
    let (vehicles, drivers, services, accidents, tyres, licenses, fuel_logs, documents) = futures::try_join!(
        card::<Vehicle>(state, role),
        card::<Driver>(state, role),
        card::<Service>(state, role),
        card::<Accident>(state, role),
        card::<Tyre>(state, role),
        card::<License>(state, role),
        card::<FuelLog>(state, role),
        card::<Document>(state, role),
    )?;

    let mut cards = vec![
        vehicles, drivers, services, accidents, tyres, licenses, fuel_logs, documents,
    ];
    if role.can_view(Collection::Users) {
        cards.push(card::<User>(state, role).await?);
    }
    Ok(cards)
}
