use axum::http::StatusCode;
use chrono::{DateTime, Local, Utc};
use domain::{
    entities::parking_sessions::{CloseParkingSessionEntity, InsertParkingSessionEntity},
    repositories::{
        config_entries::ConfigEntryRepository,
        errors::{
            ONE_ACTIVE_SESSION_PER_VEHICLE, SESSION_BARCODE_KEY, VEHICLE_PLATE_KEY,
            duplicate_constraint,
        },
        parking::ParkingRepository,
    },
    value_objects::{
        barcodes::{MAX_BARCODE_LEN, generate_barcode, normalize_barcode},
        enums::vehicle_categories::VehicleCategory,
        fees::{apply_discount, calculate_fee, format_elapsed, parked_minutes},
        money::format_cop,
        parking::{
            ActiveSessionDto, ActiveVehiclesDto, EntryReceiptDto, ExitReceiptDto,
            LookupSessionDto, MAX_NOTES_LEN, ParkingSessionDto, RecordEntryForm,
            RecordExitForm, SessionLookupDto, SessionLookupQuery, SessionWithVehicle,
            VehicleDto, VehicleEntryModel, VehicleHistoryDto, VehicleHistoryQuery,
        },
        plates::{normalize_optional_plate, normalize_plate},
        rates::RateCard,
        validation::{FieldErrors, optional_text, parse_amount},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{axum_http::error_responses::UseCaseError, usecases::rate_cards::RateCardResolver};

/// Extra attempts after a generated barcode collides with an existing one.
const BARCODE_RETRIES: usize = 3;

#[derive(Debug, Error)]
pub enum ParkingError {
    #[error("please correct the highlighted fields")]
    Validation(FieldErrors),
    #[error("vehicle {plate} already has an active parking session")]
    ActiveSessionExists { plate: String, field_errors: FieldErrors },
    #[error("vehicle {plate} is being registered by another request, try again")]
    ConcurrentEntry { plate: String },
    #[error("no active parking session matches that plate or barcode")]
    ActiveSessionNotFound,
    #[error("parking session not found")]
    SessionNotFound,
    #[error("parking session was already closed")]
    AlreadyClosed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError for ParkingError {
    fn status_code(&self) -> StatusCode {
        match self {
            ParkingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ParkingError::ActiveSessionExists { .. }
            | ParkingError::ConcurrentEntry { .. }
            | ParkingError::AlreadyClosed => StatusCode::CONFLICT,
            ParkingError::ActiveSessionNotFound | ParkingError::SessionNotFound => {
                StatusCode::NOT_FOUND
            }
            ParkingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ParkingError::Validation(errors)
            | ParkingError::ActiveSessionExists {
                field_errors: errors,
                ..
            } => Some(errors),
            _ => None,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ParkingError>;

/// Active session with what it would cost if it closed at `now`.
pub fn estimate_active(
    row: &SessionWithVehicle,
    rate_card: &RateCard,
    now: DateTime<Utc>,
) -> ActiveSessionDto {
    let fee = calculate_fee(row.session.entered_at, now, row.category(), rate_card);
    ActiveSessionDto::new(row, now, fee.amount_minor)
}

fn exit_receipt(row: &SessionWithVehicle) -> Option<ExitReceiptDto> {
    let exited_at = row.session.exited_at.filter(|_| !row.session.is_active)?;
    let final_amount_minor = row.session.amount_due_minor();

    Some(ExitReceiptDto {
        session_id: row.session.id,
        plate: row.vehicle.plate.clone(),
        category: row.category(),
        barcode: row.session.barcode.clone(),
        entered_at: row.session.entered_at,
        exited_at,
        elapsed: format_elapsed(exited_at - row.session.entered_at),
        parked_minutes: row.session.parked_minutes.unwrap_or_default(),
        gross_amount_minor: row.session.gross_amount_minor.unwrap_or_default(),
        discount_minor: row.session.discount_minor,
        final_amount_minor,
        amount_due: format_cop(final_amount_minor),
    })
}

struct ValidatedEntry {
    plate: String,
    category: VehicleCategory,
    barcode: Option<String>,
    notes: Option<String>,
}

fn validate_entry(form: &RecordEntryForm) -> UseCaseResult<ValidatedEntry> {
    let mut errors = FieldErrors::new();

    let plate = match normalize_plate(&form.plate) {
        Ok(plate) => Some(plate),
        Err(err) => {
            errors.add("plate", err.to_string());
            None
        }
    };

    let category = VehicleCategory::from_str(&form.category.trim().to_lowercase());
    if category.is_none() {
        errors.add("category", "choose car or motorcycle");
    }

    let barcode = normalize_barcode(form.barcode.as_deref());
    if barcode
        .as_ref()
        .is_some_and(|barcode| barcode.chars().count() > MAX_BARCODE_LEN)
    {
        errors.add(
            "barcode",
            format!("must be at most {MAX_BARCODE_LEN} characters"),
        );
    }

    let notes = optional_text("notes", form.notes.as_deref(), MAX_NOTES_LEN, &mut errors);

    match (plate, category) {
        (Some(plate), Some(category)) if errors.is_empty() => Ok(ValidatedEntry {
            plate,
            category,
            barcode,
            notes,
        }),
        _ => Err(ParkingError::Validation(errors)),
    }
}

pub struct ParkingUseCase<P, C>
where
    P: ParkingRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    parking_repo: Arc<P>,
    rate_card_resolver: Arc<RateCardResolver<C>>,
}

impl<P, C> ParkingUseCase<P, C>
where
    P: ParkingRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    pub fn new(parking_repo: Arc<P>, rate_card_resolver: Arc<RateCardResolver<C>>) -> Self {
        Self {
            parking_repo,
            rate_card_resolver,
        }
    }

    pub async fn record_entry(
        &self,
        user_id: Uuid,
        form: &RecordEntryForm,
    ) -> UseCaseResult<EntryReceiptDto> {
        let entry = validate_entry(form).inspect_err(|_| {
            info!(%user_id, "parking: entry rejected by validation");
        })?;
        let plate = entry.plate;

        let active = self
            .parking_repo
            .find_active_by_plate(plate.clone())
            .await
            .map_err(|err| {
                error!(%user_id, %plate, db_error = ?err, "parking: failed to check active session");
                ParkingError::Internal(err)
            })?;
        if active.is_some() {
            warn!(
                %user_id,
                %plate,
                status = StatusCode::CONFLICT.as_u16(),
                "parking: entry refused, vehicle already inside"
            );
            return Err(self.active_session_exists(plate));
        }

        let now = Utc::now();
        let generated = entry.barcode.is_none();

        for attempt in 0..=BARCODE_RETRIES {
            let barcode = entry
                .barcode
                .clone()
                .unwrap_or_else(|| generate_barcode(now.with_timezone(&Local)));

            let vehicle = VehicleEntryModel {
                plate: plate.clone(),
                category: entry.category,
                visited_at: now,
            };
            let insert_session_entity = InsertParkingSessionEntity {
                vehicle_id: Uuid::nil(),
                barcode: barcode.clone(),
                entered_at: now,
                discount_minor: 0,
                is_active: true,
                entry_user_id: Some(user_id),
                entry_notes: entry.notes.clone(),
                created_at: now,
            };

            let err = match self
                .parking_repo
                .record_entry(vehicle, insert_session_entity)
                .await
            {
                Ok(row) => {
                    info!(
                        %user_id,
                        session_id = %row.session.id,
                        %plate,
                        category = %entry.category,
                        barcode = %row.session.barcode,
                        "parking: vehicle entry recorded"
                    );
                    return Ok(EntryReceiptDto {
                        session_id: row.session.id,
                        plate: row.vehicle.plate.clone(),
                        category: row.category(),
                        entered_at: row.session.entered_at,
                        barcode: row.session.barcode,
                    });
                }
                Err(err) => err,
            };

            match duplicate_constraint(&err) {
                Some(SESSION_BARCODE_KEY) if generated && attempt < BARCODE_RETRIES => {
                    warn!(%barcode, attempt, "parking: generated barcode collided, retrying");
                }
                Some(SESSION_BARCODE_KEY) if generated => {
                    error!(%plate, db_error = ?err, "parking: no free barcode after retries");
                    return Err(ParkingError::Internal(err));
                }
                Some(SESSION_BARCODE_KEY) => {
                    return Err(ParkingError::Validation(FieldErrors::single(
                        "barcode",
                        "barcode is already in use",
                    )));
                }
                Some(ONE_ACTIVE_SESSION_PER_VEHICLE) => {
                    warn!(%plate, "parking: concurrent entry lost the active-session race");
                    return Err(self.active_session_exists(plate));
                }
                Some(VEHICLE_PLATE_KEY) => {
                    warn!(%plate, "parking: concurrent first entry for vehicle");
                    return Err(ParkingError::ConcurrentEntry { plate });
                }
                _ => {
                    error!(%user_id, %plate, db_error = ?err, "parking: failed to record entry");
                    return Err(ParkingError::Internal(err));
                }
            }
        }

        Err(ParkingError::Internal(anyhow::anyhow!(
            "barcode retries exhausted"
        )))
    }

    fn active_session_exists(&self, plate: String) -> ParkingError {
        ParkingError::ActiveSessionExists {
            field_errors: FieldErrors::single(
                "plate",
                format!("vehicle {plate} already has an active parking session"),
            ),
            plate,
        }
    }

    pub async fn record_exit(
        &self,
        user_id: Uuid,
        form: &RecordExitForm,
    ) -> UseCaseResult<ExitReceiptDto> {
        let mut errors = FieldErrors::new();
        let barcode = normalize_barcode(form.barcode.as_deref());
        let plate = normalize_optional_plate(form.plate.as_deref()).unwrap_or_else(|err| {
            errors.add("plate", err.to_string());
            None
        });
        if barcode.is_none() && plate.is_none() {
            errors.add("plate", "enter a plate or a barcode");
        }
        let discount_minor = match form.discount.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_amount("discount", raw, &mut errors),
            _ => Some(0),
        };
        let notes = optional_text("notes", form.notes.as_deref(), MAX_NOTES_LEN, &mut errors);
        errors.into_result().map_err(ParkingError::Validation)?;
        let discount_minor = discount_minor.unwrap_or_default();

        let row = self
            .find_active(barcode.clone(), plate.clone())
            .await?
            .ok_or_else(|| {
                info!(%user_id, ?barcode, ?plate, "parking: exit requested with no active session");
                ParkingError::ActiveSessionNotFound
            })?;

        let rate_card = self.rate_card_resolver.current().await.map_err(|err| {
            error!(db_error = ?err, "parking: failed to load rates for exit");
            ParkingError::Internal(err)
        })?;

        let now = Utc::now();
        let fee = calculate_fee(row.session.entered_at, now, row.category(), &rate_card);
        let final_amount_minor = apply_discount(fee.amount_minor, discount_minor);

        let close_session_entity = CloseParkingSessionEntity {
            exited_at: Some(now),
            parked_minutes: Some(parked_minutes(row.session.entered_at, now)),
            gross_amount_minor: Some(fee.amount_minor),
            discount_minor,
            final_amount_minor: Some(final_amount_minor),
            is_active: false,
            exit_user_id: Some(user_id),
            exit_notes: notes,
            updated_at: Some(now),
        };

        let session_id = row.session.id;
        let closed = self
            .parking_repo
            .close_session(session_id, close_session_entity)
            .await
            .map_err(|err| {
                error!(%user_id, %session_id, db_error = ?err, "parking: failed to close session");
                ParkingError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(
                    %session_id,
                    status = StatusCode::CONFLICT.as_u16(),
                    "parking: session closed by another request"
                );
                ParkingError::AlreadyClosed
            })?;

        info!(
            %user_id,
            %session_id,
            plate = %row.vehicle.plate,
            total_minutes = fee.total_minutes,
            gross_amount_minor = fee.amount_minor,
            discount_minor,
            final_amount_minor,
            "parking: vehicle exit recorded"
        );

        let closed_row = SessionWithVehicle {
            session: closed,
            vehicle: row.vehicle,
        };
        exit_receipt(&closed_row).ok_or(ParkingError::AlreadyClosed)
    }

    /// A supplied barcode decides the lookup on its own; the plate is used only without one.
    async fn find_active(
        &self,
        barcode: Option<String>,
        plate: Option<String>,
    ) -> UseCaseResult<Option<SessionWithVehicle>> {
        if let Some(barcode) = barcode {
            return self
                .parking_repo
                .find_active_by_barcode(barcode.clone())
                .await
                .map_err(|err| {
                    error!(%barcode, db_error = ?err, "parking: failed to look up barcode");
                    ParkingError::Internal(err)
                });
        }

        match plate {
            Some(plate) => self
                .parking_repo
                .find_active_by_plate(plate.clone())
                .await
                .map_err(|err| {
                    error!(%plate, db_error = ?err, "parking: failed to look up plate");
                    ParkingError::Internal(err)
                }),
            None => Ok(None),
        }
    }

    async fn load_session(&self, session_id: Uuid) -> UseCaseResult<SessionWithVehicle> {
        self.parking_repo
            .find_session(session_id)
            .await
            .map_err(|err| {
                error!(%session_id, db_error = ?err, "parking: failed to load session");
                ParkingError::Internal(err)
            })?
            .ok_or(ParkingError::SessionNotFound)
    }

    pub async fn entry_receipt(&self, session_id: Uuid) -> UseCaseResult<EntryReceiptDto> {
        let row = self.load_session(session_id).await?;

        Ok(EntryReceiptDto {
            session_id: row.session.id,
            plate: row.vehicle.plate.clone(),
            category: row.category(),
            entered_at: row.session.entered_at,
            barcode: row.session.barcode,
        })
    }

    pub async fn exit_receipt(&self, session_id: Uuid) -> UseCaseResult<ExitReceiptDto> {
        let row = self.load_session(session_id).await?;
        exit_receipt(&row).ok_or(ParkingError::SessionNotFound)
    }

    pub async fn lookup_active(&self, query: &SessionLookupQuery) -> UseCaseResult<SessionLookupDto> {
        let barcode = normalize_barcode(query.barcode.as_deref());
        let plate = match normalize_optional_plate(query.plate.as_deref()) {
            Ok(plate) => plate,
            Err(err) => return Ok(SessionLookupDto::missing(err.to_string())),
        };
        if barcode.is_none() && plate.is_none() {
            return Ok(SessionLookupDto::missing("Enter a plate or a barcode"));
        }

        let Some(row) = self.find_active(barcode, plate).await? else {
            return Ok(SessionLookupDto::missing("No active session found"));
        };

        let rate_card = self.rate_card_resolver.current().await.map_err(|err| {
            error!(db_error = ?err, "parking: failed to load rates for lookup");
            ParkingError::Internal(err)
        })?;
        let now = Utc::now();
        let fee = calculate_fee(row.session.entered_at, now, row.category(), &rate_card);

        Ok(SessionLookupDto::found(LookupSessionDto {
            id: row.session.id,
            plate: row.vehicle.plate.clone(),
            category: row.category(),
            entered_at: row
                .session
                .entered_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            elapsed: format_elapsed(now - row.session.entered_at),
            estimated_amount: format_cop(fee.amount_minor),
        }))
    }

    pub async fn list_active(&self) -> UseCaseResult<ActiveVehiclesDto> {
        let rows = self.parking_repo.list_active().await.map_err(|err| {
            error!(db_error = ?err, "parking: failed to list active sessions");
            ParkingError::Internal(err)
        })?;
        let rate_card = self.rate_card_resolver.current().await.map_err(|err| {
            error!(db_error = ?err, "parking: failed to load rates for active list");
            ParkingError::Internal(err)
        })?;

        let now = Utc::now();
        let sessions = rows
            .iter()
            .map(|row| estimate_active(row, &rate_card, now))
            .collect();

        Ok(ActiveVehiclesDto {
            sessions,
            rates: rate_card,
        })
    }

    pub async fn vehicle_history(
        &self,
        query: &VehicleHistoryQuery,
    ) -> UseCaseResult<VehicleHistoryDto> {
        let vehicles = self.parking_repo.list_vehicles().await.map_err(|err| {
            error!(db_error = ?err, "parking: failed to list vehicles");
            ParkingError::Internal(err)
        })?;

        let searched_plate = normalize_optional_plate(query.plate.as_deref()).map_err(|err| {
            ParkingError::Validation(FieldErrors::single("plate", err.to_string()))
        })?;
        let mut vehicle = None;
        let mut sessions = Vec::new();

        if let Some(plate) = &searched_plate {
            vehicle = self
                .parking_repo
                .find_vehicle_by_plate(plate.clone())
                .await
                .map_err(|err| {
                    error!(%plate, db_error = ?err, "parking: failed to find vehicle");
                    ParkingError::Internal(err)
                })?;

            if let Some(found) = &vehicle {
                sessions = self
                    .parking_repo
                    .list_vehicle_sessions(found.id)
                    .await
                    .map_err(|err| {
                        error!(%plate, db_error = ?err, "parking: failed to list vehicle sessions");
                        ParkingError::Internal(err)
                    })?;
            }
        }

        let total_collected_minor = sessions
            .iter()
            .filter(|row| !row.session.is_active)
            .map(|row| row.session.amount_due_minor())
            .sum();
        let total_parked_minutes = sessions
            .iter()
            .filter_map(|row| row.session.parked_minutes)
            .map(i64::from)
            .sum();

        Ok(VehicleHistoryDto {
            searched_plate,
            vehicle: vehicle.as_ref().map(VehicleDto::from),
            vehicles: vehicles.iter().map(VehicleDto::from).collect(),
            total_visits: sessions.len(),
            sessions: sessions.iter().map(ParkingSessionDto::from).collect(),
            total_collected_minor,
            total_parked_minutes,
        })
    }
}
