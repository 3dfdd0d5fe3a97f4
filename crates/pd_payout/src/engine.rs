//! Payout aggregation. Pure functions, no I/O.

use std::collections::HashMap;

use pd_core::{Article, AuthorPayout, PayoutLine, PayoutRate};

/// Groups `articles` by exact author string and accumulates one aggregate
/// per author, in the order each author was first encountered. Line items
/// keep the article order of the input.
pub fn calculate(articles: &[Article], rates: &PayoutRate) -> Vec<AuthorPayout> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut payouts: Vec<AuthorPayout> = Vec::new();

    for article in articles {
        let rate = rates.rate_for(article.kind);
        let slot = match index.get(article.author.as_str()) {
            Some(&slot) => slot,
            None => {
                payouts.push(AuthorPayout {
                    author: article.author.clone(),
                    article_count: 0,
                    total_payout: 0.0,
                    articles: Vec::new(),
                });
                let slot = payouts.len() - 1;
                index.insert(article.author.as_str(), slot);
                slot
            }
        };

        let payout = &mut payouts[slot];
        payout.article_count += 1;
        payout.total_payout += rate;
        payout.articles.push(PayoutLine {
            id: article.id.clone(),
            title: article.title.clone(),
            kind: article.kind,
            published_at: article.published_at.clone(),
            rate,
        });
    }

    payouts
}

/// Reprices existing aggregates against a new rate table without the raw
/// articles: each line's rate is re-resolved from its stored type and
/// totals are re-summed. Author set, counts and ordering are untouched, so
/// `rescale(calculate(a, r1), r2) == calculate(a, r2)`.
pub fn rescale(previous: &[AuthorPayout], rates: &PayoutRate) -> Vec<AuthorPayout> {
    previous
        .iter()
        .map(|payout| {
            let articles: Vec<PayoutLine> = payout
                .articles
                .iter()
                .map(|line| PayoutLine {
                    rate: rates.rate_for(line.kind),
                    ..line.clone()
                })
                .collect();
            let total_payout = articles.iter().map(|line| line.rate).sum();
            AuthorPayout {
                author: payout.author.clone(),
                article_count: payout.article_count,
                total_payout,
                articles,
            }
        })
        .collect()
}
