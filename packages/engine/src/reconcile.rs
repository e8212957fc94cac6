//! Reconciliation: project a law's operations onto its tree.
//!
//! [`reconcile`] is a pure function of (law tree, operations, config). Per
//! article the precedence is whole-law derogation, then chapter derogation,
//! then the article's entry in the [`ChangeSet`], else unchanged.
//! Incorporations of numbers absent from the tree are inserted afterwards
//! by [`crate::insertion`].

use std::collections::BTreeSet;

use cotejo_shared::numbering::{division_value, same_division};
use cotejo_shared::{Article, ArticleRef, Chapter, Inciso, Law, LawNumber, Operation, Title};

use crate::article_text::{parse_article_text, render_article};
use crate::comparison::{
    container_disposition, ComparedArticle, ComparedChapter, ComparedLaw, ComparedTitle, Comparison,
    Disposition, Metadata, SourceOperation,
};
use crate::config::{ChapterFallback, ReconcileConfig, CHAPTER_DEROGATION_ACTION, WHOLE_LAW_DEROGATION_ACTION};
use crate::index::{ArticleChange, ChangeSet, ChangeSource, IncisoEdit};
use crate::insertion;
use crate::warning::ReconcileWarning;

/// Comparison tree plus the conditions found while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub comparison: Comparison,
    pub warnings: Vec<ReconcileWarning>,
}

/// Reconcile `law` with `operations`, which must already be restricted to
/// this law. Operations are applied in slice order.
pub fn reconcile(law: &Law, operations: &[Operation], config: &ReconcileConfig) -> ReconcileOutcome {
    Reconciler::new(law, operations, config).run()
}

struct Reconciler<'a> {
    law: &'a Law,
    config: &'a ReconcileConfig,
    changes: ChangeSet,
    /// Article numbers present in the source tree.
    visited: BTreeSet<ArticleRef>,
    /// Parallel to `changes.chapters`.
    applied_chapters: Vec<bool>,
    warnings: Vec<ReconcileWarning>,
}

impl<'a> Reconciler<'a> {
    fn new(law: &'a Law, operations: &[Operation], config: &'a ReconcileConfig) -> Self {
        let mut changes = ChangeSet::build(operations);
        let warnings = std::mem::take(&mut changes.warnings);
        let applied_chapters = vec![false; changes.chapters.len()];
        Self {
            law,
            config,
            changes,
            visited: BTreeSet::new(),
            applied_chapters,
            warnings,
        }
    }

    fn run(mut self) -> ReconcileOutcome {
        for duplicate in self.law.duplicate_articles() {
            self.warn(ReconcileWarning::DuplicateArticleNumber {
                scope: duplicate.scope,
                number: duplicate.number,
            });
        }
        if let Some(whole) = self.changes.whole_law.as_ref().filter(|w| !w.confirmed) {
            let warning = ReconcileWarning::UnconfirmedWholeLawDerogation {
                dictamen_article: whole.source.dictamen_article.clone(),
            };
            self.warn(warning);
        }

        let law = self.law;
        let mut titles: Vec<ComparedTitle> = law.titles.iter().map(|t| self.compare_title(t)).collect();
        self.add_missing_chapters(&mut titles);
        self.add_incorporations(&mut titles);
        self.report_unmatched();

        let whole_law = self.changes.whole_law.is_some();
        for title in &mut titles {
            refresh_dispositions(title, whole_law);
        }

        let comparison = Comparison {
            metadatos: self.metadata(&titles),
            ley: ComparedLaw {
                numero: self.law.number.clone(),
                nombre: self.law.name.clone(),
                titulos: titles,
            },
        };
        tracing::info!(
            law = %comparison.metadatos.ley_numero,
            substituted = comparison.metadatos.total_sustituciones,
            incorporated = comparison.metadatos.total_incorporaciones,
            derogated = comparison.metadatos.total_derogaciones,
            warnings = self.warnings.len(),
            "law reconciled"
        );
        ReconcileOutcome {
            comparison,
            warnings: self.warnings,
        }
    }

    fn compare_title(&mut self, title: &Title) -> ComparedTitle {
        let articulos = title.articles.iter().map(|a| self.compare_article(a, None)).collect();
        let capitulos = title.chapters.iter().map(|c| self.compare_chapter(title, c)).collect();
        ComparedTitle {
            numero: title.number.clone(),
            nombre: title.name.clone(),
            estado: Disposition::Unchanged,
            articulos,
            capitulos,
        }
    }

    fn compare_chapter(&mut self, title: &Title, chapter: &Chapter) -> ComparedChapter {
        let config = self.config;
        let derogation = self.changes.chapters.iter().position(|d| {
            same_division(&d.number, &chapter.number)
                && d.title.as_deref().is_none_or(|t| same_division(t, &title.number))
        });
        let Some(index) = derogation else {
            return ComparedChapter {
                numero: chapter.number.clone(),
                nombre: chapter.name.clone(),
                estado: Disposition::Unchanged,
                accion: None,
                dictamen_articulo: None,
                articulos: chapter.articles.iter().map(|a| self.compare_article(a, None)).collect(),
            };
        };

        self.applied_chapters[index] = true;
        let source = self.changes.chapters[index].source.clone();
        let through_chapter = chapter_source(&source);
        let mut articulos: Vec<ComparedArticle> = chapter
            .articles
            .iter()
            .map(|a| self.compare_article(a, Some(through_chapter.clone())))
            .collect();

        if articulos.is_empty() {
            match config.fallback_for(&chapter.number, Some(&title.number)) {
                Some(fallback) => {
                    articulos = synthesize(fallback, &through_chapter);
                    self.warn(ReconcileWarning::ChapterFallbackApplied {
                        dictamen_article: source.dictamen_article.clone(),
                        chapter: chapter.number.clone(),
                        articles: articulos.len(),
                    });
                }
                None => self.warn(ReconcileWarning::EmptyDerogatedChapter {
                    dictamen_article: source.dictamen_article.clone(),
                    chapter: chapter.number.clone(),
                }),
            }
        }

        ComparedChapter {
            numero: chapter.number.clone(),
            nombre: chapter.name.clone(),
            estado: Disposition::Derogated,
            accion: Some(source.action.verb().to_string()),
            dictamen_articulo: Some(source.dictamen_article),
            articulos,
        }
    }

    fn compare_article(&mut self, article: &Article, through_chapter: Option<SourceOperation>) -> ComparedArticle {
        let compared = ComparedArticle::unchanged(article);
        let reference = article.reference();
        if let Some(reference) = reference {
            self.visited.insert(reference);
        }

        if let Some(whole) = &self.changes.whole_law {
            return compared.derogate(SourceOperation {
                accion: WHOLE_LAW_DEROGATION_ACTION.to_string(),
                dictamen_articulo: whole.source.dictamen_article.clone(),
            });
        }
        if let Some(source) = through_chapter {
            return compared.derogate(source);
        }

        let Some(change) = reference.and_then(|r| self.changes.articles.get(&r)).cloned() else {
            return compared;
        };
        match change {
            ArticleChange::Substitute { source, text } => substitute(compared, &text, &source),
            ArticleChange::Incorporate { source, text } => {
                self.warn(ReconcileWarning::IncorporationOfExistingArticle {
                    dictamen_article: source.dictamen_article.clone(),
                    article: compared.numero.clone(),
                });
                substitute(compared, &text, &source)
            }
            ArticleChange::Derogate { source } => compared.derogate(source.to_source_operation()),
            ArticleChange::Incisos { source, edits } => edit_incisos(compared, &edits, &source),
        }
    }

    /// Derogated chapters that are not in the tree: add the configured
    /// placeholder chapter to its Título, or report.
    fn add_missing_chapters(&mut self, titles: &mut Vec<ComparedTitle>) {
        let config = self.config;
        for index in 0..self.changes.chapters.len() {
            if self.applied_chapters[index] {
                continue;
            }
            let derogation = self.changes.chapters[index].clone();
            let Some(fallback) = config.fallback_for(&derogation.number, derogation.title.as_deref()) else {
                self.warn(ReconcileWarning::ChapterNotFound {
                    dictamen_article: derogation.source.dictamen_article.clone(),
                    chapter: derogation.number.clone(),
                });
                continue;
            };

            let title = match titles.iter().position(|t| same_division(&t.numero, &fallback.title)) {
                Some(position) => position,
                None => {
                    titles.push(ComparedTitle {
                        numero: fallback.title.clone(),
                        nombre: fallback.title_name.clone(),
                        estado: Disposition::Unchanged,
                        articulos: Vec::new(),
                        capitulos: Vec::new(),
                    });
                    titles.len() - 1
                }
            };

            let articulos = synthesize(fallback, &chapter_source(&derogation.source));
            self.warn(ReconcileWarning::ChapterFallbackApplied {
                dictamen_article: derogation.source.dictamen_article.clone(),
                chapter: fallback.chapter.clone(),
                articles: articulos.len(),
            });
            let chapter = ComparedChapter {
                numero: fallback.chapter.clone(),
                nombre: fallback.chapter_name.clone(),
                estado: Disposition::Derogated,
                accion: Some(derogation.source.action.verb().to_string()),
                dictamen_articulo: Some(derogation.source.dictamen_article.clone()),
                articulos,
            };
            let chapters = &mut titles[title].capitulos;
            let order = division_value(&fallback.chapter);
            let at = chapters
                .iter()
                .position(|c| division_value(&c.numero) > order)
                .unwrap_or(chapters.len());
            chapters.insert(at, chapter);
            self.applied_chapters[index] = true;
        }
    }

    fn add_incorporations(&mut self, titles: &mut [ComparedTitle]) {
        let pending: Vec<(ArticleRef, ChangeSource, String)> = self
            .changes
            .articles
            .iter()
            .filter(|(reference, _)| !self.visited.contains(*reference))
            .filter_map(|(reference, change)| match change {
                ArticleChange::Incorporate { source, text } => Some((*reference, source.clone(), text.clone())),
                _ => None,
            })
            .collect();

        for (reference, source, text) in pending {
            if self.changes.whole_law.is_some() {
                self.warn(ReconcileWarning::IncorporationUnderWholeLawDerogation {
                    dictamen_article: source.dictamen_article.clone(),
                    article: reference.to_string(),
                });
                continue;
            }
            let Some(point) = insertion::locate(titles, reference) else {
                self.warn(ReconcileWarning::NoInsertionPoint {
                    dictamen_article: source.dictamen_article.clone(),
                    article: reference.to_string(),
                });
                continue;
            };
            tracing::debug!(article = %reference, title = %titles[point.title].numero, "article incorporated");
            insertion::insert(titles, point, incorporated(reference, &text, &source));
        }
    }

    /// Article changes whose number is not in the tree and that are not
    /// incorporations.
    fn report_unmatched(&mut self) {
        let unmatched: Vec<ReconcileWarning> = self
            .changes
            .articles
            .iter()
            .filter(|(reference, change)| {
                !self.visited.contains(*reference) && !matches!(change, ArticleChange::Incorporate { .. })
            })
            .map(|(reference, change)| ReconcileWarning::ArticleNotFound {
                dictamen_article: change.source().dictamen_article.clone(),
                article: reference.to_string(),
            })
            .collect();
        for warning in unmatched {
            self.warn(warning);
        }
    }

    fn metadata(&self, titles: &[ComparedTitle]) -> Metadata {
        let count = |estado: Disposition| {
            titles
                .iter()
                .flat_map(ComparedTitle::all_articles)
                .filter(|a| a.estado == estado)
                .count()
        };
        let mut capitulos_derogados: Vec<String> = Vec::new();
        for (derogation, applied) in self.changes.chapters.iter().zip(&self.applied_chapters) {
            if *applied && !capitulos_derogados.contains(&derogation.number) {
                capitulos_derogados.push(derogation.number.clone());
            }
        }
        Metadata {
            ley_numero: LawNumber::normalize(&self.law.number),
            total_sustituciones: count(Disposition::Substituted),
            total_incorporaciones: count(Disposition::Incorporated),
            total_derogaciones: count(Disposition::Derogated),
            capitulos_derogados,
            derogacion_total: self.changes.whole_law.is_some(),
            advertencias: self.warnings.iter().map(ToString::to_string).collect(),
        }
    }

    fn warn(&mut self, warning: ReconcileWarning) {
        if self.warnings.contains(&warning) {
            return;
        }
        tracing::warn!(law = %self.law.number, "{warning}");
        self.warnings.push(warning);
    }
}

fn chapter_source(source: &ChangeSource) -> SourceOperation {
    SourceOperation {
        accion: CHAPTER_DEROGATION_ACTION.to_string(),
        dictamen_articulo: source.dictamen_article.clone(),
    }
}

fn synthesize(fallback: &ChapterFallback, source: &SourceOperation) -> Vec<ComparedArticle> {
    fallback
        .texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let mut article = ComparedArticle::unchanged(&Article {
                number: fallback.article_id(i + 1),
                body_text: text.clone(),
                ..Article::default()
            })
            .derogate(source.clone());
            article.sintetico = true;
            article
        })
        .collect()
}

/// First non-empty rendering of the new text. `raw` is never empty.
fn new_body(parsed_body: &str, incisos: &[Inciso], heading: &str, raw: &str) -> String {
    [
        parsed_body.to_string(),
        render_article("", incisos),
        heading.to_string(),
        raw.trim().to_string(),
    ]
    .into_iter()
    .find(|text| !text.is_empty())
    .unwrap_or_default()
}

fn substitute(mut compared: ComparedArticle, text: &str, source: &ChangeSource) -> ComparedArticle {
    let parsed = parse_article_text(text);
    compared.estado = Disposition::Substituted;
    compared.texto_original = Some(compared.texto.clone());
    compared.texto_nuevo = Some(new_body(&parsed.texto, &parsed.incisos, &parsed.titulo, text));
    compared.titulo_nuevo = Some(parsed.titulo).filter(|t| !t.is_empty());
    if !parsed.incisos.is_empty() {
        compared.incisos_originales = Some(compared.incisos.clone());
        compared.incisos_nuevos = Some(parsed.incisos);
    }
    compared.record(source.to_source_operation())
}

fn edit_incisos(mut compared: ComparedArticle, edits: &[IncisoEdit], source: &ChangeSource) -> ComparedArticle {
    let mut incisos = compared.incisos.clone();
    for edit in edits {
        let letter = edit.letter().to_string();
        let position = incisos.iter().position(|i| i.letter.trim().eq_ignore_ascii_case(&letter));
        match (edit, position) {
            (IncisoEdit::Replace { text, .. }, Some(at)) => incisos[at].text = text.clone(),
            (IncisoEdit::Replace { text, .. }, None) => {
                incisos.push(Inciso {
                    letter,
                    text: text.clone(),
                });
                incisos.sort_by(|a, b| a.letter.to_lowercase().cmp(&b.letter.to_lowercase()));
            }
            (IncisoEdit::Remove { .. }, Some(at)) => {
                incisos.remove(at);
            }
            (IncisoEdit::Remove { .. }, None) => {
                tracing::debug!(article = %compared.numero, inciso = %letter, "derogated inciso not present");
            }
        }
    }

    let letters: Vec<String> = edits.iter().map(|e| e.letter().to_string()).collect();
    let qualifier = match letters.as_slice() {
        [single] => format!("inciso {single}"),
        many => format!("incisos {}", many.join(", ")),
    };
    let rendered = render_article(&compared.texto, &incisos);
    // Nothing left of the article: equivalent to derogating it.
    if rendered.is_empty() {
        return compared.derogate(source.annotated(&qualifier));
    }

    compared.estado = Disposition::Substituted;
    compared.texto_original = Some(compared.texto.clone());
    compared.texto_nuevo = Some(rendered);
    compared.incisos_originales = Some(compared.incisos.clone());
    compared.incisos_nuevos = Some(incisos);
    compared.record(source.annotated(&qualifier))
}

fn incorporated(reference: ArticleRef, text: &str, source: &ChangeSource) -> ComparedArticle {
    let parsed = parse_article_text(text);
    let texto = new_body(&parsed.texto, &[], &parsed.titulo, text);
    let article = Article {
        number: reference.to_string(),
        title_text: parsed.titulo,
        body_text: texto,
        incisos: parsed.incisos,
    };
    let mut compared = ComparedArticle::unchanged(&article);
    compared.estado = Disposition::Incorporated;
    compared.record(source.to_source_operation())
}

fn refresh_dispositions(title: &mut ComparedTitle, whole_law: bool) {
    for chapter in &mut title.capitulos {
        let explicit = whole_law || chapter.estado == Disposition::Derogated;
        chapter.estado = container_disposition(explicit, &chapter.articulos);
    }
    let estado = container_disposition(whole_law, title.all_articles());
    title.estado = match estado {
        Disposition::Unchanged if title.capitulos.iter().any(|c| c.estado != Disposition::Unchanged) => {
            Disposition::Substituted
        }
        other => other,
    };
}
