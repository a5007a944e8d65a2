mod common;

use std::sync::atomic::Ordering;

use common::{banking_index, banking_turns, bot, user, ScriptedJudge};
use nomatch_core::api::{
    run_analysis, AnalysisConfig, AnalysisInput, Decision, JudgeError, JudgeMode, JudgePlugin,
    JudgeResult, SlotSignal, TurnTable,
};
use pretty_assertions::assert_eq;

fn input(table: TurnTable, judge: Option<Box<dyn JudgePlugin>>) -> AnalysisInput {
    AnalysisInput {
        run_id: "run-test".into(),
        table,
        index: banking_index(),
        judge,
        progress: false,
    }
}

fn cfg() -> AnalysisConfig {
    AnalysisConfig {
        max_workers: Some(3),
        ..AnalysisConfig::default()
    }
}

fn answer(decision: Decision, intent: &str, confidence: f64) -> JudgeResult {
    JudgeResult {
        decision,
        flow_recommended: "Tarjetas".into(),
        intent_recommended: vec![intent.into()],
        intents_relevantes: vec![intent.into()],
        why: "scripted".into(),
        confidence,
        ..JudgeResult::default()
    }
}

#[tokio::test]
async fn no_judge_run_yields_one_fallback_row_per_case_in_order() {
    let run = run_analysis(input(banking_turns(), None), &cfg())
        .await
        .unwrap();

    assert_eq!(run.judge_mode, JudgeMode::NoJudge);
    assert_eq!(run.judge_name, None);
    let ids: Vec<&str> = run.rows.iter().map(|r| r.case_id.as_str()).collect();
    assert_eq!(ids, vec!["s1:3", "s2:3", "s2:5"]);
    assert_eq!(run.stats.cases, 3);
    assert_eq!(run.stats.no_judge, 3);
    assert_eq!(run.stats.review_flagged, 3);

    for row in &run.rows {
        assert_eq!(row.decision, Decision::Ambiguous);
        assert_eq!(row.confidence, 0.5);
        assert!(row.review_flag);
    }

    let first = &run.rows[0];
    assert_eq!(first.trigger_text, "Quiero ver mi resumen de cuenta");
    assert_eq!(first.bot_no_match_text, "No entendí");
    assert_eq!(first.intent_top, "Cuentas_Resumen");
    assert_eq!(first.top_evidence[0].phrase, "quiero ver mi resumen de cuenta");
    assert!((first.top_evidence[0].similarity - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn flow_ref_skips_neutral_and_no_match_turns() {
    let run = run_analysis(input(banking_turns(), None), &cfg())
        .await
        .unwrap();

    assert_eq!(run.rows[0].flow_ref, "SALUDO");
    assert_eq!(run.rows[0].last_valid_intent, "SALUDO_BIENVENIDA");
    assert_eq!(run.rows[1].flow_ref, "Tarjetas");
    assert_eq!(run.rows[1].last_valid_intent, "Tarjetas_Limite");
    assert_eq!(run.rows[2].flow_ref, "Tarjetas");
    assert_eq!(run.rows[1].slot_signals, vec![SlotSignal::Currency]);
}

#[tokio::test]
async fn judged_rows_are_post_validated() {
    let judge = ScriptedJudge::new(vec![
        Ok(answer(Decision::MissedExistingIntentInFlow, "Cuentas_Resumen", 0.9)),
        // short trigger with a currency signal, not a parameter decision
        Ok(answer(Decision::MissedExistingIntentInFlow, "Tarjetas_Limite", 0.9)),
        // out-of-domain keyword with weak evidence
        Ok(answer(Decision::FlowSwitch, "Tarjetas_Limite", 0.4)),
    ]);
    let calls = judge.calls.clone();
    let max_in_flight = judge.max_in_flight.clone();
    let seen = judge.seen_cases.clone();

    let run = run_analysis(input(banking_turns(), Some(Box::new(judge))), &cfg())
        .await
        .unwrap();

    assert_eq!(run.judge_mode, JudgeMode::Judge);
    assert_eq!(run.judge_name.as_deref(), Some("scripted"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().unwrap(), vec!["s1:3", "s2:3", "s2:5"]);

    assert_eq!(run.rows[0].confidence, 0.9);
    assert!(!run.rows[0].review_flag);

    assert_eq!(run.rows[1].confidence, 0.65);
    assert!(run.rows[1].review_flag);

    assert_eq!(run.rows[2].decision, Decision::OutOfScope);
    assert_eq!(run.rows[2].confidence, 0.85);
    assert!(!run.rows[2].review_flag);

    assert_eq!(run.stats.judged, 3);
    assert_eq!(run.stats.review_flagged, 1);
}

#[tokio::test]
async fn new_intent_is_capped_when_flow_has_a_strong_candidate() {
    let table = TurnTable::new(vec![
        user("s", 0, "quiero mi resumen", "Cuentas_Resumen"),
        bot("s", 1, "Aquí tienes tu resumen", "Cuentas_Resumen"),
        user("s", 2, "quiero ver mi resumen de cuenta", ""),
        bot("s", 3, "No entendí", "NO_MATCH"),
    ])
    .unwrap();
    let judge = ScriptedJudge::new(vec![Ok(answer(
        Decision::NewIntentInFlow,
        "Cuentas_ResumenNuevo",
        0.9,
    ))]);

    let run = run_analysis(input(table, Some(Box::new(judge))), &cfg())
        .await
        .unwrap();

    let row = &run.rows[0];
    assert_eq!(row.flow_ref, "Cuentas");
    assert_eq!(row.decision, Decision::NewIntentInFlow);
    assert_eq!(row.confidence, 0.6);
    assert!(row.review_flag);
    assert_eq!(row.intent_top, "Cuentas_ResumenNuevo");
}

#[tokio::test]
async fn a_failed_case_does_not_affect_the_others() {
    let judge = ScriptedJudge::new(vec![
        Ok(answer(Decision::MissedExistingIntentInFlow, "Cuentas_Resumen", 0.8)),
        Err(JudgeError::Timeout(120_000)),
        Ok(answer(Decision::OutOfScope, "", 0.7)),
    ]);

    let run = run_analysis(input(banking_turns(), Some(Box::new(judge))), &cfg())
        .await
        .unwrap();

    assert_eq!(run.judge_mode, JudgeMode::Judge);
    assert_eq!(run.rows.len(), 3);
    assert_eq!(run.stats.judged, 2);
    assert_eq!(run.stats.failed, 1);

    let failed = &run.rows[1];
    assert_eq!(failed.case_id, "s2:3");
    assert_eq!(failed.decision, Decision::Ambiguous);
    assert_eq!(failed.confidence, 0.0);
    assert!(failed.review_flag);
    assert!(failed.why.contains("120000"));
    assert!(failed.intent_top.is_empty());

    assert_eq!(run.rows[0].confidence, 0.8);
    assert_eq!(run.rows[2].decision, Decision::OutOfScope);
}

#[tokio::test]
async fn warm_up_failure_switches_the_run_to_no_judge() {
    let judge = ScriptedJudge::new(Vec::new()).failing_warm_up();
    let calls = judge.calls.clone();

    let run = run_analysis(input(banking_turns(), Some(Box::new(judge))), &cfg())
        .await
        .unwrap();

    assert_eq!(run.judge_mode, JudgeMode::NoJudge);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(run.stats.no_judge, 3);
    assert!(run.rows.iter().all(|r| r.confidence == 0.5 && r.review_flag));
}

#[tokio::test]
async fn results_do_not_depend_on_worker_count() {
    let single = AnalysisConfig {
        max_workers: Some(1),
        ..AnalysisConfig::default()
    };
    let many = AnalysisConfig {
        max_workers: Some(8),
        ..AnalysisConfig::default()
    };

    let a = run_analysis(input(banking_turns(), None), &single).await.unwrap();
    let b = run_analysis(input(banking_turns(), None), &many).await.unwrap();
    assert_eq!(a.rows, b.rows);
}

#[tokio::test]
async fn sessions_without_no_match_produce_no_rows() {
    let table = TurnTable::new(vec![
        user("s", 0, "hola", "SALUDO_HOLA"),
        bot("s", 1, "hola!", "SALUDO_HOLA"),
    ])
    .unwrap();

    let run = run_analysis(input(table, None), &cfg()).await.unwrap();
    assert!(run.rows.is_empty());
    assert_eq!(run.stats.cases, 0);
}
