#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use nomatch_core::api::{
    CasePayload, JudgeError, JudgePlugin, JudgeResult, Speaker, TrainingCatalog, TrainingIndex,
    TrainingRecord, Turn, TurnTable,
};

pub fn user(session: &str, idx: u32, text: &str, intent: &str) -> Turn {
    Turn::new(session, idx, "2024-05-01", Speaker::User, text, intent)
}

pub fn bot(session: &str, idx: u32, text: &str, intent: &str) -> Turn {
    Turn::new(session, idx, "2024-05-01", Speaker::Bot, text, intent)
}

/// Two sessions, three NO_MATCH cases.
pub fn banking_turns() -> TurnTable {
    TurnTable::new(vec![
        user("s1", 0, "Hola", ""),
        bot("s1", 1, "Bienvenido", "SALUDO_BIENVENIDA"),
        user("s1", 2, "Quiero ver mi resumen de cuenta", ""),
        bot("s1", 3, "No entendí", "NO_MATCH"),
        user("s2", 0, "cual es el limite de mi tarjeta", "Tarjetas_Limite"),
        bot("s2", 1, "Tu límite es 1000", "Tarjetas_Limite"),
        user("s2", 2, "y en dólares", ""),
        bot("s2", 3, "Perdón, no entendí", "NO_MATCH_GENERIC"),
        user("s2", 4, "me pasas una receta de torta", ""),
        bot("s2", 5, "No entendí", "NO_MATCH"),
    ])
    .expect("valid fixture turns")
}

pub fn banking_index() -> TrainingIndex {
    let catalog = TrainingCatalog::new(vec![
        TrainingRecord::new("Cuentas_Resumen", "quiero ver mi resumen de cuenta"),
        TrainingRecord::new("Cuentas_Resumen", "resumen de la cuenta"),
        TrainingRecord::new("Cuentas_Saldo", "cual es mi saldo"),
        TrainingRecord::new("Tarjetas_Limite", "cual es el limite de mi tarjeta"),
        TrainingRecord::new("Tarjetas_Limite", "limite de compra en dolares"),
        TrainingRecord::new("Tarjetas_Adicional", "pedir tarjeta adicional"),
    ])
    .expect("valid fixture catalog");
    TrainingIndex::build(catalog)
}

/// Judge that replays scripted answers in order and records its calls.
pub struct ScriptedJudge {
    pub warm_up_error: Option<JudgeError>,
    pub answers: VecDeque<Result<JudgeResult, JudgeError>>,
    pub calls: Arc<AtomicUsize>,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
    pub seen_cases: Arc<std::sync::Mutex<Vec<String>>>,
}

impl ScriptedJudge {
    pub fn new(answers: Vec<Result<JudgeResult, JudgeError>>) -> Self {
        Self {
            warm_up_error: None,
            answers: answers.into(),
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            seen_cases: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn failing_warm_up(mut self) -> Self {
        self.warm_up_error = Some(JudgeError::Unavailable("model not loaded".into()));
        self
    }
}

#[async_trait]
impl JudgePlugin for ScriptedJudge {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn warm_up(&mut self) -> Result<(), JudgeError> {
        match self.warm_up_error.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn judge(&mut self, payload: &CasePayload) -> Result<JudgeResult, JudgeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_cases
            .lock()
            .expect("seen_cases lock")
            .push(payload.case_id.clone());

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let answer = self
            .answers
            .pop_front()
            .unwrap_or_else(|| Err(JudgeError::Transport("script exhausted".into())));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        answer
    }
}
