use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;

/// 审核流程使用的邮件模板
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    /// 商家申请已提交
    Apply,
    /// 商家申请审核通过
    Approve,
    /// 商家申请审核驳回
    Reject,
}

#[derive(Debug, Clone)]
pub struct MailData {
    pub username: String,
    pub remark: Option<String>,
}

/// SMTP 邮件发送器，进程启动时构造一次，作为依赖注入到 AppState
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

fn render(template: MailTemplate, data: &MailData) -> (&'static str, String) {
    let remark = data.remark.as_deref().unwrap_or("无");

    match template {
        MailTemplate::Apply => (
            "商家申请提交成功",
            format!(
                "<p>您的商家申请已提交成功，我们会在 1-2 个工作日内审核，审核通过后会通过邮件通知您。</p>\
                 <p>账户：<span>{}</span></p>",
                data.username
            ),
        ),
        MailTemplate::Approve => (
            "商家申请审核结果",
            format!(
                "<p>您的商家申请已审核完毕，审核结果如下：</p>\
                 <p>账户：<span>{}</span></p>\
                 <p>审核结果：<span style=\"color: #00ff00\">审核通过</span></p>\
                 <p>审核备注：{}</p>",
                data.username, remark
            ),
        ),
        MailTemplate::Reject => (
            "商家申请审核结果",
            format!(
                "<p>您的商家申请已审核完毕，审核结果如下：</p>\
                 <p>账户：<span>{}</span></p>\
                 <p>审核结果：<span style=\"color: #ff0000\">审核不通过</span></p>\
                 <p>审核备注：{}</p>",
                data.username, remark
            ),
        ),
    }
}

impl Mailer {
    pub fn from_config(config: &Config) -> Result<Self, lettre::transport::smtp::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .credentials(Credentials::new(
                config.smtp_account.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.mail_from.clone(),
        })
    }

    /// 异步发送，不等待结果
    ///
    /// 审核流转先提交事务再发邮件，发送失败只记日志，不回滚已提交的状态。
    pub fn spawn_send(&self, to: &str, template: MailTemplate, data: MailData) {
        if to.is_empty() {
            tracing::warn!("skip mail for {}: no email address", data.username);
            return;
        }

        let (subject, html) = render(template, &data);

        let from = match self.from.parse::<lettre::message::Mailbox>() {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("invalid mail sender {}: {}", self.from, e);
                return;
            }
        };
        let to_mailbox = match to.parse::<lettre::message::Mailbox>() {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("invalid mail recipient {}: {}", to, e);
                return;
            }
        };

        let message = match Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
        {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("failed to build mail to {}: {}", to, e);
                return;
            }
        };

        let transport = self.transport.clone();
        let to = to.to_string();
        tokio::spawn(async move {
            match transport.send(message).await {
                Ok(_) => tracing::info!("mail sent to {}", to),
                Err(e) => tracing::error!("failed to send mail to {}: {}", to, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_template_contains_username_and_remark() {
        let (subject, html) = render(
            MailTemplate::Approve,
            &MailData {
                username: "shop01".into(),
                remark: Some("资质齐全".into()),
            },
        );
        assert_eq!(subject, "商家申请审核结果");
        assert!(html.contains("shop01"));
        assert!(html.contains("资质齐全"));
        assert!(html.contains("审核通过"));
    }

    #[test]
    fn reject_template_defaults_missing_remark() {
        let (_, html) = render(
            MailTemplate::Reject,
            &MailData {
                username: "shop02".into(),
                remark: None,
            },
        );
        assert!(html.contains("审核不通过"));
        assert!(html.contains("审核备注：无"));
    }

    #[test]
    fn apply_template_has_no_verdict() {
        let (subject, html) = render(
            MailTemplate::Apply,
            &MailData {
                username: "shop03".into(),
                remark: None,
            },
        );
        assert_eq!(subject, "商家申请提交成功");
        assert!(!html.contains("审核结果："));
    }
}
