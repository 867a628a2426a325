use rubrica_core::scoring::AssessmentScore;
use rubrica_core::processor::StageTimings;
use rubrica_core::{ParsingConfig, ProcessedArea};

pub fn print_areas(config: &ParsingConfig) {
    println!("\n📚 Known áreas:");
    for area in &config.areas {
        println!("  {:<18} {}", area.id, area.name);
    }
}

pub fn print_summary(processed: &ProcessedArea) {
    let profile = &processed.profile;
    println!("📊 Área '{}':", profile.area);
    println!("   - Objectives: {}", profile.total_objectives);
    println!("   - Actions: {}", profile.total_actions);
    println!("   - Sections: {}", profile.total_sections);
    println!("   - Questions: {}", profile.total_questions);

    let per_objective = profile
        .actions_per_objective
        .iter()
        .map(|(number, count)| format!("{number}:{count}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!("   - Actions per objective: {per_objective}");
    println!(
        "   - Descriptor words: min {} / max {} / mean {:.1}",
        profile.descriptor_words.min, profile.descriptor_words.max, profile.descriptor_words.mean
    );
}

pub fn print_timings(timings: &StageTimings) {
    println!("\n⏱  Stage timings:");
    for line in timings.report_lines() {
        println!("   {line}");
    }
    println!("   {:<18} {:>9.3} ms", "total", timings.total().as_secs_f64() * 1000.0);
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "n/a".to_string(), |s| format!("{s:.2}"))
}

pub fn print_score(score: &AssessmentScore) {
    println!("\n🎯 Assessment against '{}':", score.target);
    println!(
        "   Completion: {}/{} dimensions ({:.0}%)",
        score.answered,
        score.expected,
        score.completion * 100.0
    );

    for objective in &score.objectives {
        println!(
            "   OBJETIVO {} {:.<40} {}",
            objective.number,
            objective.title,
            format_score(objective.score)
        );
        for action in &objective.actions {
            println!("      {:<24} {}", action.accion_id, format_score(action.score));
        }
    }
    println!("   Área score: {}", format_score(score.score));

    let gaps = score.gaps();
    if !gaps.is_empty() {
        println!("\n📉 Largest gaps:");
        for (accion_id, dimension) in gaps.iter().take(5) {
            println!(
                "   {accion_id} / {}: {} (-{})",
                dimension.dimension, dimension.level, dimension.gap
            );
        }
    }
}
