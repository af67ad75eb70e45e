//! 角色专属的提示词模板（德语）
//!
//! 纯字符串渲染，无 IO；由工具分发层在委派子智能体前调用。

use crate::tools::ContentType;

/// Content Creator：大纲或全文
pub fn content_prompt(topic: &str, instructions: &str, content_type: ContentType) -> String {
    match content_type {
        ContentType::Outline => format!(
            "🎯 AUFTRAG: Erstelle ein detailliertes, strukturiertes Inhaltsverzeichnis für einen Kurs über \"{topic}\".\n\n\
             OBLIGATORISCHE ELEMENTE:\n\
             - Nummerierte Hauptkapitel (1., 2., 3., ...) mit klaren Unterkapiteln (1.1, 1.2, ...)\n\
             - 3-5 konkrete Lernziele pro Hauptkapitel im Format \"Nach diesem Kapitel können Sie...\"\n\
             - Grobe Beschreibung (2-3 Sätze) und geschätzte Lesedauer pro Kapitel\n\
             - Zielgruppe und Voraussetzungen in einer Kurs-Übersicht\n\
             - Logische Progression: Grundlagen → Anwendung → Vertiefung\n\n\
             ADDITIONAL INSTRUCTIONS:\n{instructions}"
        ),
        ContentType::Full => format!(
            "🎯 AUFTRAG: Erstelle den VOLLSTÄNDIGEN Kursinhalt für \"{topic}\" basierend auf dem genehmigten Outline.\n\n\
             PRO KAPITEL:\n\
             - Lernziele aus dem Outline übernehmen\n\
             - Detaillierter Hauptinhalt mit mindestens einem praktischen Beispiel pro Hauptkonzept\n\
             - Kurze Zusammenfassung der Kernpunkte\n\
             - 2-3 Reflexionsfragen\n\n\
             CONTENT-STANDARDS: Deutsche Sprache, konsistente Terminologie, Abschnitte unter 500 Wörtern, \
             Bullet Points für Listen, Markdown-Format.\n\n\
             ADDITIONAL INSTRUCTIONS:\n{instructions}"
        ),
    }
}

/// Didactic Expert：didaktische Anreicherung
pub fn didactic_prompt(content: &str) -> String {
    format!(
        "🎓 DIDAKTISCHE OPTIMIERUNG: Verwandle den folgenden Kursentwurf in eine effektive Lernerfahrung.\n\n\
         EINGANGSMATERIAL:\n{content}\n\n\
         OPTIMIERUNGS-ZIELE:\n\
         - Fehlende Lernziele ergänzen (Format: \"Nach diesem Kapitel können Sie...\")\n\
         - Mindestens 2 konkrete Beispiele pro Hauptkonzept, progressiver Schwierigkeitsgrad\n\
         - Kapitel-Zusammenfassungen als Bullet Points, plus Checkpoint-Fragen\n\
         - Lange Sätze aufteilen (max. 20 Wörter/Satz), Fachbegriffe sofort erklären\n\
         - Logische Übergänge zwischen Abschnitten sicherstellen\n\n\
         AUSGABE: Der komplette, verbesserte Kurs in Markdown-Format."
    )
}

/// Quality Checker：Standard-Review oder Korrektur nach Feedback
pub fn quality_prompt(content: &str, feedback: Option<&str>) -> String {
    match feedback {
        Some(feedback) if !feedback.trim().is_empty() => format!(
            "🔍 QUALITÄTS-VERBESSERUNG: Korrigiere den Kurs basierend auf spezifischem Feedback!\n\n\
             URSPRÜNGLICHER KURS:\n{content}\n\n\
             VERBESSERUNGS-ANWEISUNGEN:\n{feedback}\n\n\
             WICHTIG: Gib NUR den korrigierten, vollständigen Kursinhalt in Markdown aus, \
             keine Bewertung, keine Analyse."
        ),
        _ => format!(
            "🔍 KRITISCHE QUALITÄTSPRÜFUNG: Prüfe und verbessere den folgenden Kurs!\n\n\
             ZU PRÜFENDER INHALT:\n{content}\n\n\
             AUFGABEN:\n\
             - Struktur prüfen: Lernziele, Hierarchie, Beispiele\n\
             - Didaktik bewerten: Verständlichkeit, Progression\n\
             - Konsistenz validieren: Terminologie, Sprache\n\
             - Fehlende Lernziele und Zusammenfassungen sofort ergänzen\n\n\
             AUSGABE: Der komplette, qualitätsgesicherte Kurs in Markdown-Format mit allen Verbesserungen."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_prompt_varies_by_type() {
        let outline = content_prompt("Marketing", "", ContentType::Outline);
        let full = content_prompt("Marketing", "", ContentType::Full);
        assert!(outline.contains("Inhaltsverzeichnis"));
        assert!(full.contains("VOLLSTÄNDIGEN"));
        assert!(outline.contains("Marketing") && full.contains("Marketing"));
    }

    #[test]
    fn test_quality_prompt_switches_to_feedback_mode() {
        let standard = quality_prompt("Inhalt", None);
        let feedback = quality_prompt("Inhalt", Some("Mehr Beispiele"));
        assert!(standard.contains("QUALITÄTSPRÜFUNG"));
        assert!(feedback.contains("VERBESSERUNGS-ANWEISUNGEN"));
        assert!(feedback.contains("Mehr Beispiele"));
    }
}
