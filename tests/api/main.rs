mod health_check;
mod helpers;
mod mailer;
mod rate_watcher;
mod storage;
mod subscription;
