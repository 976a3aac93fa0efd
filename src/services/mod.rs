/*
 * Responsibility
 * - HTTP に依存しないドメインサービス群
 */
pub mod auth;
