//! Falhas do cliente de casos.
//!
//! Nenhuma delas chega ao relatório: a consulta converte qualquer erro no
//! sentinela "No workspace". A distinção serve para o log e para os testes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaseError {
    /// HTTP 429. Consultas não são repetidas; o item fica sem workspace.
    #[error("case system rate limited the request")]
    RateLimited,

    /// Resposta fora da faixa 2xx (ticket expirado, caso inexistente, 5xx).
    #[error("case system returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Corpo que não é o JSON de autenticação ou de saída esperado.
    #[error("unreadable response: {0}")]
    Parse(String),
}

impl CaseError {
    /// Ticket rejeitado pelo servidor. Todas as consultas seguintes falharão.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CaseError::Api { status: 401, .. })
    }
}
