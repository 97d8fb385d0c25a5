use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use clinassist_client::{
    ApiClient, ApiRequest, ApiResponse, BoxFuture, ClientError, Method, Transport,
};
use clinassist_core::Page;
use clinassist_core::models::dashboard::{ChartDataPoint, DashboardStats};
use clinassist_core::models::patient::{Patient, PatientCreateRequest, PatientStatus};
use clinassist_core::models::prediction::{PredictionDto, PredictionType};
use clinassist_core::models::seance::{
    CompleteSeanceRequest, Seance, SeanceCreateRequest, SeanceStatus,
};
use clinassist_core::models::therapeute::Therapeute;
use clinassist_core::models::user::{AuthResponse, LoginRequest, User};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::fixtures;

type Reply = (u16, Value);

#[derive(Default)]
struct Clinic {
    users: Vec<(User, String)>,
    therapeutes: Vec<Therapeute>,
    patients: Vec<Patient>,
    seances: Vec<Seance>,
    predictions: Vec<PredictionDto>,
    next_id: i64,
}

#[derive(Default)]
struct Faults {
    failing: Vec<String>,
    delays: Vec<(String, Duration)>,
}

/// Stateful fake of the REST backend.
///
/// Requests are answered from an in-memory clinic: writes mutate it, reads
/// observe it, and every request is recorded. Any non-auth request without
/// a bearer token is answered 401. Tokens are `token-{user_id}`.
#[derive(Default)]
pub struct FakeBackend {
    clinic: Mutex<Clinic>,
    faults: Mutex<Faults>,
    requests: Mutex<Vec<ApiRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeBackend {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A backend holding the clinic described in [`fixtures`].
    pub fn seeded() -> Arc<Self> {
        let patients = fixtures::patients();
        let clinic = Clinic {
            users: fixtures::users(),
            therapeutes: fixtures::therapeutes(),
            seances: fixtures::seances(&patients),
            predictions: fixtures::predictions(&patients),
            patients,
            next_id: 1000,
        };
        Arc::new(Self {
            clinic: Mutex::new(clinic),
            ..Self::default()
        })
    }

    pub fn api(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(self.clone())
    }

    /// Answer 500 to every request whose path starts with `prefix`.
    pub fn fail(&self, prefix: &str) {
        lock(&self.faults).failing.push(prefix.to_string());
    }

    pub fn heal(&self) {
        lock(&self.faults).failing.clear();
    }

    /// Hold responses to paths starting with `prefix` for `delay`. The
    /// answer is computed when the request arrives.
    pub fn delay(&self, prefix: &str, delay: Duration) {
        lock(&self.faults).delays.push((prefix.to_string(), delay));
    }

    pub fn clear_delays(&self) {
        lock(&self.faults).delays.clear();
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    pub fn patients(&self) -> Vec<Patient> {
        lock(&self.clinic).patients.clone()
    }

    pub fn seances(&self) -> Vec<Seance> {
        lock(&self.clinic).seances.clone()
    }

    pub fn seance(&self, id: i64) -> Option<Seance> {
        lock(&self.clinic).seances.iter().find(|s| s.id == id).cloned()
    }

    pub fn insert_patient(&self, patient: Patient) {
        lock(&self.clinic).patients.push(patient);
    }

    pub fn insert_seance(&self, seance: Seance) {
        lock(&self.clinic).seances.push(seance);
    }

    pub fn insert_prediction(&self, prediction: PredictionDto) {
        lock(&self.clinic).predictions.push(prediction);
    }

    pub fn set_patient_status(&self, id: i64, status: PatientStatus) {
        if let Some(p) = lock(&self.clinic).patients.iter_mut().find(|p| p.id == id) {
            p.status = status;
        }
    }

    pub fn set_seance_status(&self, id: i64, status: SeanceStatus) {
        if let Some(s) = lock(&self.clinic).seances.iter_mut().find(|s| s.id == id) {
            s.status = status;
        }
    }

    fn fault_for(&self, path: &str) -> (bool, Option<Duration>) {
        let faults = lock(&self.faults);
        let failing = faults.failing.iter().any(|p| path.starts_with(p.as_str()));
        let delay = faults
            .delays
            .iter()
            .find(|(p, _)| path.starts_with(p.as_str()))
            .map(|(_, d)| *d);
        (failing, delay)
    }

    fn handle(&self, request: &ApiRequest) -> Reply {
        let segments: Vec<&str> = request
            .path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["auth", "login"]) => return self.login(request),
            (Method::Post, ["auth", "refresh"]) => return self.refresh(request),
            _ => {}
        }

        let Some(caller) = request.bearer.as_deref().and_then(user_id_from_token) else {
            return (401, json!({"message": "Full authentication is required"}));
        };

        let mut clinic = lock(&self.clinic);
        let clinic = &mut *clinic;

        match (request.method, segments.as_slice()) {
            // Patients
            (Method::Get, ["patients"]) => paged(clinic.patients.clone(), request),
            (Method::Get, ["patients", "search"]) => {
                let term = request.query_value("q").unwrap_or_default();
                let hits = clinic
                    .patients
                    .iter()
                    .filter(|p| p.matches_search(term))
                    .cloned()
                    .collect();
                paged(hits, request)
            }
            (Method::Get, ["patients", "high-risk"]) => {
                let min = query_f64(request, "minRisk").unwrap_or(70.0);
                let hits: Vec<&Patient> = clinic
                    .patients
                    .iter()
                    .filter(|p| p.risk_score.is_some_and(|r| r >= min))
                    .collect();
                ok(&hits)
            }
            (Method::Get, ["patients", "code", code]) => {
                found(clinic.patients.iter().find(|p| p.patient_code == *code))
            }
            (Method::Get, ["patients", "therapeute", id]) => with_id(id, |tid| {
                let owned: Vec<&Patient> = clinic
                    .patients
                    .iter()
                    .filter(|p| p.assigned_therapeute_id == Some(tid))
                    .collect();
                ok(&owned)
            }),
            (Method::Get, ["patients", id]) => with_id(id, |id| {
                found(clinic.patients.iter().find(|p| p.id == id))
            }),
            (Method::Post, ["patients"]) => {
                with_body(request, |body: PatientCreateRequest| create_patient(clinic, body))
            }
            (Method::Put, ["patients", id]) => with_id(id, |id| {
                with_body(request, |body: PatientCreateRequest| {
                    match clinic.patients.iter_mut().find(|p| p.id == id) {
                        Some(p) => {
                            apply_patient(p, body);
                            ok(&*p)
                        }
                        None => not_found(),
                    }
                })
            }),
            (Method::Patch, ["patients", id, "status"]) => with_id(id, |id| {
                let Some(status) = query_enum::<PatientStatus>(request, "status") else {
                    return bad_request("status");
                };
                match clinic.patients.iter_mut().find(|p| p.id == id) {
                    Some(p) => {
                        p.status = status;
                        ok(&*p)
                    }
                    None => not_found(),
                }
            }),
            (Method::Patch, ["patients", id, "assign", tid]) => with_id(id, |id| {
                with_id(tid, |tid| {
                    let name = clinic
                        .therapeutes
                        .iter()
                        .find(|t| t.id == tid)
                        .map(Therapeute::display_name);
                    let Some(name) = name else {
                        return not_found();
                    };
                    match clinic.patients.iter_mut().find(|p| p.id == id) {
                        Some(p) => {
                            p.assigned_therapeute_id = Some(tid);
                            p.assigned_therapeute_name = Some(name);
                            ok(&*p)
                        }
                        None => not_found(),
                    }
                })
            }),

            // Therapists
            (Method::Get, ["therapeutes"]) => paged(clinic.therapeutes.clone(), request),
            (Method::Get, ["therapeutes", "available"]) => {
                let available: Vec<&Therapeute> =
                    clinic.therapeutes.iter().filter(|t| t.available).collect();
                ok(&available)
            }
            (Method::Get, ["therapeutes", "search"]) => {
                let term = request.query_value("q").unwrap_or_default().to_lowercase();
                let hits = clinic
                    .therapeutes
                    .iter()
                    .filter(|t| {
                        t.display_name().to_lowercase().contains(&term)
                            || t.specialization.to_lowercase().contains(&term)
                    })
                    .cloned()
                    .collect();
                paged(hits, request)
            }
            (Method::Get, ["therapeutes", "me"]) => found(
                clinic
                    .therapeutes
                    .iter()
                    .find(|t| t.user_id == Some(caller)),
            ),
            (Method::Get, ["therapeutes", "user", uid]) => with_id(uid, |uid| {
                found(clinic.therapeutes.iter().find(|t| t.user_id == Some(uid)))
            }),
            (Method::Get, ["therapeutes", id]) => with_id(id, |id| {
                found(clinic.therapeutes.iter().find(|t| t.id == id))
            }),
            (Method::Patch, ["therapeutes", id, "availability"]) => with_id(id, |id| {
                let Some(available) = request
                    .query_value("available")
                    .and_then(|v| v.parse::<bool>().ok())
                else {
                    return bad_request("available");
                };
                match clinic.therapeutes.iter_mut().find(|t| t.id == id) {
                    Some(t) => {
                        t.available = available;
                        ok(&*t)
                    }
                    None => not_found(),
                }
            }),

            // Seances
            (Method::Get, ["seances"]) => paged(clinic.seances.clone(), request),
            (Method::Get, ["seances", "upcoming"]) => {
                let from = fixtures::TODAY.at(0, 0, 0, 0);
                let mut upcoming: Vec<&Seance> = clinic
                    .seances
                    .iter()
                    .filter(|s| s.scheduled_at >= from && !s.status.is_terminal())
                    .collect();
                upcoming.sort_by_key(|s| s.scheduled_at);
                ok(&upcoming)
            }
            (Method::Get, ["seances", "today"]) => {
                let today: Vec<&Seance> = clinic
                    .seances
                    .iter()
                    .filter(|s| s.scheduled_date() == fixtures::TODAY)
                    .collect();
                ok(&today)
            }
            (Method::Get, ["seances", "range"]) => {
                let (Some(start), Some(end)) = (
                    query_parse::<jiff::civil::DateTime>(request, "start"),
                    query_parse::<jiff::civil::DateTime>(request, "end"),
                ) else {
                    return bad_request("start/end");
                };
                let hits: Vec<&Seance> = clinic
                    .seances
                    .iter()
                    .filter(|s| s.scheduled_at >= start && s.scheduled_at <= end)
                    .collect();
                ok(&hits)
            }
            (Method::Get, ["seances", "patient", pid]) => with_id(pid, |pid| {
                let hits: Vec<&Seance> =
                    clinic.seances.iter().filter(|s| s.patient_id == pid).collect();
                ok(&hits)
            }),
            (Method::Get, ["seances", "therapeute", tid]) => with_id(tid, |tid| {
                let hits: Vec<&Seance> = clinic
                    .seances
                    .iter()
                    .filter(|s| s.therapeute_id == tid)
                    .collect();
                ok(&hits)
            }),
            (Method::Get, ["seances", "therapeute", tid, "today"]) => with_id(tid, |tid| {
                let hits: Vec<&Seance> = clinic
                    .seances
                    .iter()
                    .filter(|s| s.therapeute_id == tid && s.scheduled_date() == fixtures::TODAY)
                    .collect();
                ok(&hits)
            }),
            (Method::Get, ["seances", id]) => with_id(id, |id| {
                found(clinic.seances.iter().find(|s| s.id == id))
            }),
            (Method::Post, ["seances"]) => {
                with_body(request, |body: SeanceCreateRequest| create_seance(clinic, body))
            }
            (Method::Put, ["seances", id]) => with_id(id, |id| {
                with_body(request, |body: SeanceCreateRequest| {
                    match clinic.seances.iter_mut().find(|s| s.id == id) {
                        Some(s) => {
                            s.patient_id = body.patient_id;
                            s.therapeute_id = body.therapeute_id;
                            s.seance_type = body.seance_type;
                            s.scheduled_at = body.scheduled_at;
                            s.duration_minutes = body.duration_minutes;
                            s.notes = body.notes;
                            s.objectives = body.objectives;
                            ok(&*s)
                        }
                        None => not_found(),
                    }
                })
            }),
            (Method::Patch, ["seances", id, "status"]) => with_id(id, |id| {
                let Some(status) = query_enum::<SeanceStatus>(request, "status") else {
                    return bad_request("status");
                };
                update_seance(clinic, id, |s| s.status = status)
            }),
            (Method::Patch, ["seances", id, "complete"]) => with_id(id, |id| {
                with_body(request, |body: CompleteSeanceRequest| {
                    update_seance(clinic, id, |s| {
                        s.status = SeanceStatus::Completed;
                        s.notes = body.notes;
                        s.outcomes = body.outcomes;
                    })
                })
            }),
            (Method::Patch, ["seances", id, "cancel"]) => with_id(id, |id| {
                let reason = request.query_value("reason").map(str::to_string);
                update_seance(clinic, id, |s| {
                    s.status = SeanceStatus::Cancelled;
                    if reason.is_some() {
                        s.notes = reason;
                    }
                })
            }),
            (Method::Patch, ["seances", id, "reschedule"]) => with_id(id, |id| {
                let Some(when) = query_parse::<jiff::civil::DateTime>(request, "newDateTime")
                else {
                    return bad_request("newDateTime");
                };
                update_seance(clinic, id, |s| {
                    s.status = SeanceStatus::Rescheduled;
                    s.scheduled_at = when;
                })
            }),

            // Predictions
            (Method::Get, ["predictions", "patient", pid]) => with_id(pid, |pid| {
                let hits: Vec<&PredictionDto> = clinic
                    .predictions
                    .iter()
                    .filter(|p| p.patient_id == pid)
                    .collect();
                ok(&hits)
            }),
            (Method::Get, ["predictions", "high-risk"]) => {
                let min = query_f64(request, "minRisk").unwrap_or(30.0);
                let hits: Vec<&PredictionDto> = clinic
                    .predictions
                    .iter()
                    .filter(|p| p.risk_level.is_some_and(|r| r >= min))
                    .collect();
                ok(&hits)
            }
            (Method::Get, ["predictions", "active"]) => ok(&clinic.predictions),
            (Method::Get, ["predictions", "stats"]) => {
                let total = clinic.predictions.len() as u64;
                let successful = clinic
                    .predictions
                    .iter()
                    .filter(|p| p.was_accurate == Some(true))
                    .count() as u64;
                let accuracy = if total == 0 {
                    0.0
                } else {
                    successful as f64 * 100.0 / total as f64
                };
                ok(&json!({"accuracy": accuracy, "total": total, "successful": successful}))
            }
            (Method::Post, ["predictions", "patient", pid, kind]) => with_id(pid, |pid| {
                let kind = match *kind {
                    "next-session" => PredictionType::NextSession,
                    "dropout-risk" => PredictionType::DropoutRisk,
                    _ => return not_found(),
                };
                generate_prediction(clinic, pid, kind)
            }),
            (Method::Patch, ["predictions", id, "reviewed"]) => with_id(id, |id| {
                match clinic.predictions.iter_mut().find(|p| p.id == id) {
                    Some(p) => {
                        p.was_accurate = Some(true);
                        ok(&*p)
                    }
                    None => not_found(),
                }
            }),
            (Method::Delete, ["predictions", id]) => with_id(id, |id| {
                let before = clinic.predictions.len();
                clinic.predictions.retain(|p| p.id != id);
                if clinic.predictions.len() == before {
                    not_found()
                } else {
                    (204, Value::Null)
                }
            }),

            // Dashboard
            (Method::Get, ["dashboard", "stats"]) => {
                let scope = request
                    .query_value("therapeuteId")
                    .and_then(|v| v.parse::<i64>().ok());
                ok(&dashboard_stats(clinic, scope))
            }
            (Method::Get, ["dashboard", "weekly-activity"]) => ok(&vec![
                point("Lun", 4.0),
                point("Mar", 6.0),
                point("Mer", 5.0),
                point("Jeu", 7.0),
                point("Ven", 3.0),
            ]),
            (Method::Get, ["dashboard", "monthly-activity"]) => {
                ok(&vec![point("Jan", 48.0), point("Fév", 52.0), point("Mar", 21.0)])
            }
            (Method::Get, ["dashboard", "seances-by-type"]) => {
                let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
                for s in &clinic.seances {
                    *counts.entry(s.seance_type.as_str()).or_default() += 1;
                }
                ok(&counts)
            }

            _ => not_found(),
        }
    }

    fn login(&self, request: &ApiRequest) -> Reply {
        let Some(body) = request.body.clone() else {
            return bad_request("body");
        };
        let Ok(credentials) = serde_json::from_value::<LoginRequest>(body) else {
            return bad_request("credentials");
        };
        let clinic = lock(&self.clinic);
        let user = clinic.users.iter().find(|(u, password)| {
            (u.username == credentials.username_or_email || u.email == credentials.username_or_email)
                && *password == credentials.password
        });
        match user {
            Some((user, _)) => ok(&AuthResponse {
                access_token: format!("token-{}", user.id),
                refresh_token: format!("refresh-{}", user.id),
                user: user.clone(),
            }),
            None => (401, json!({"message": "Identifiants invalides"})),
        }
    }

    fn refresh(&self, request: &ApiRequest) -> Reply {
        let user_id = request
            .header_value("X-Refresh-Token")
            .and_then(|t| t.strip_prefix("refresh-"))
            .and_then(|id| id.parse::<i64>().ok());
        let clinic = lock(&self.clinic);
        match user_id.and_then(|id| clinic.users.iter().find(|(u, _)| u.id == id)) {
            Some((user, _)) => ok(&AuthResponse {
                access_token: format!("token-{}", user.id),
                refresh_token: format!("refresh-{}", user.id),
                user: user.clone(),
            }),
            None => (401, json!({"message": "Invalid refresh token"})),
        }
    }
}

impl Transport for FakeBackend {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        lock(&self.requests).push(request.clone());
        let (failing, delay) = self.fault_for(&request.path);
        let (status, body) = if failing {
            (500, json!({"message": "Internal Server Error"}))
        } else {
            self.handle(&request)
        };
        tracing::trace!(method = %request.method, path = %request.path, status, "fake backend reply");

        let body = if body.is_null() {
            Vec::new()
        } else {
            serde_json::to_vec(&body).unwrap_or_default()
        };

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(ApiResponse { status, body })
        })
    }
}

fn user_id_from_token(token: &str) -> Option<i64> {
    token.strip_prefix("token-")?.parse().ok()
}

fn ok<T: Serialize + ?Sized>(value: &T) -> Reply {
    match serde_json::to_value(value) {
        Ok(v) => (200, v),
        Err(e) => (500, json!({"message": e.to_string()})),
    }
}

fn found<T: Serialize>(value: Option<&T>) -> Reply {
    match value {
        Some(v) => ok(v),
        None => not_found(),
    }
}

fn not_found() -> Reply {
    (404, json!({"message": "Not found"}))
}

fn bad_request(what: &str) -> Reply {
    (400, json!({"message": format!("invalid {what}")}))
}

fn with_id(raw: &str, f: impl FnOnce(i64) -> Reply) -> Reply {
    match raw.parse::<i64>() {
        Ok(id) => f(id),
        Err(_) => bad_request("id"),
    }
}

fn with_body<B: DeserializeOwned>(request: &ApiRequest, f: impl FnOnce(B) -> Reply) -> Reply {
    match request.body.clone().map(serde_json::from_value::<B>) {
        Some(Ok(body)) => f(body),
        _ => bad_request("body"),
    }
}

fn query_parse<T: std::str::FromStr>(request: &ApiRequest, key: &str) -> Option<T> {
    request.query_value(key)?.parse().ok()
}

fn query_f64(request: &ApiRequest, key: &str) -> Option<f64> {
    query_parse(request, key)
}

fn query_enum<T: DeserializeOwned>(request: &ApiRequest, key: &str) -> Option<T> {
    serde_json::from_value(Value::String(request.query_value(key)?.to_string())).ok()
}

/// Spring-style paging over `items` using the `page`/`size` query.
fn paged<T: Serialize>(items: Vec<T>, request: &ApiRequest) -> Reply {
    let page = query_parse::<u32>(request, "page").unwrap_or(0);
    let size = query_parse::<u32>(request, "size").unwrap_or(20);
    match Page::paginate(items, page, size) {
        Ok(page) => ok(&page),
        Err(e) => (400, json!({"message": e.to_string()})),
    }
}

fn point(label: &str, value: f64) -> ChartDataPoint {
    ChartDataPoint {
        label: label.to_string(),
        value,
        color: None,
    }
}

fn next_id(clinic: &mut Clinic) -> i64 {
    clinic.next_id += 1;
    clinic.next_id
}

fn apply_patient(patient: &mut Patient, body: PatientCreateRequest) {
    patient.first_name = body.first_name;
    patient.last_name = body.last_name;
    patient.full_name = Some(format!("{} {}", patient.first_name, patient.last_name));
    patient.email = Some(body.email);
    patient.phone_number = body.phone_number.or(patient.phone_number.take());
    patient.date_of_birth = body.date_of_birth.or(patient.date_of_birth);
    patient.gender = body.gender.or(patient.gender);
    patient.address = body.address.or(patient.address.take());
    patient.city = body.city.or(patient.city.take());
    patient.postal_code = body.postal_code.or(patient.postal_code.take());
    patient.medical_history = body.medical_history.or(patient.medical_history.take());
    patient.notes = body.notes.or(patient.notes.take());
    if body.assigned_therapeute_id.is_some() {
        patient.assigned_therapeute_id = body.assigned_therapeute_id;
    }
}

fn create_patient(clinic: &mut Clinic, body: PatientCreateRequest) -> Reply {
    if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
        return bad_request("name");
    }
    if clinic
        .patients
        .iter()
        .any(|p| p.email.as_deref() == Some(body.email.as_str()))
    {
        return (409, json!({"message": "Email already in use"}));
    }
    let id = next_id(clinic);
    let mut patient = fixtures::patient(id, "", "", None, PatientStatus::Active, None);
    patient.date_of_birth = None;
    patient.age = None;
    patient.city = None;
    patient.country = None;
    apply_patient(&mut patient, body);
    clinic.patients.push(patient.clone());
    (201, serde_json::to_value(&patient).unwrap_or(Value::Null))
}

fn create_seance(clinic: &mut Clinic, body: SeanceCreateRequest) -> Reply {
    let Some(patient) = clinic.patients.iter().find(|p| p.id == body.patient_id).cloned() else {
        return not_found();
    };
    let id = next_id(clinic);
    let mut seance = fixtures::seance(
        id,
        &patient,
        body.therapeute_id,
        SeanceStatus::PendingApproval,
        body.scheduled_at,
    );
    seance.seance_type = body.seance_type;
    seance.duration_minutes = body.duration_minutes;
    seance.notes = body.notes;
    seance.objectives = body.objectives;
    seance.is_video_session = body.is_video_session.unwrap_or(false);
    clinic.seances.push(seance.clone());
    (201, serde_json::to_value(&seance).unwrap_or(Value::Null))
}

fn update_seance(clinic: &mut Clinic, id: i64, f: impl FnOnce(&mut Seance)) -> Reply {
    match clinic.seances.iter_mut().find(|s| s.id == id) {
        Some(s) => {
            f(s);
            ok(&*s)
        }
        None => not_found(),
    }
}

fn generate_prediction(clinic: &mut Clinic, patient_id: i64, kind: PredictionType) -> Reply {
    let Some(patient) = clinic.patients.iter().find(|p| p.id == patient_id).cloned() else {
        return not_found();
    };
    let id = next_id(clinic);
    let dto = fixtures::prediction(
        id,
        &patient,
        Some(kind),
        patient.risk_score.unwrap_or(0.0),
        None,
        json!({"Historique": 1.0}),
    );
    clinic.predictions.insert(0, dto.clone());
    ok(&dto)
}

fn dashboard_stats(clinic: &Clinic, therapeute_id: Option<i64>) -> DashboardStats {
    let patients: Vec<&Patient> = clinic
        .patients
        .iter()
        .filter(|p| therapeute_id.is_none() || p.assigned_therapeute_id == therapeute_id)
        .collect();
    let seances: Vec<&Seance> = clinic
        .seances
        .iter()
        .filter(|s| therapeute_id.is_none_or(|t| s.therapeute_id == t))
        .collect();

    let completed = seances
        .iter()
        .filter(|s| s.status == SeanceStatus::Completed)
        .count() as u64;
    let mut patients_by_status = BTreeMap::new();
    for p in &patients {
        *patients_by_status
            .entry(p.status.as_str().to_string())
            .or_default() += 1;
    }

    DashboardStats {
        total_patients: patients.len() as u64,
        active_patients: patients
            .iter()
            .filter(|p| p.status == PatientStatus::Active)
            .count() as u64,
        total_therapeutes: clinic.therapeutes.len() as u64,
        available_therapeutes: clinic.therapeutes.iter().filter(|t| t.available).count() as u64,
        total_seances: seances.len() as u64,
        today_seances: seances
            .iter()
            .filter(|s| s.scheduled_date() == fixtures::TODAY)
            .count() as u64,
        completed_seances_this_month: completed,
        high_risk_patients: patients
            .iter()
            .filter(|p| p.risk_score.is_some_and(|r| r >= 70.0))
            .count() as u64,
        total_predictions: clinic.predictions.len() as u64,
        patients_by_status,
        ..DashboardStats::default()
    }
}
