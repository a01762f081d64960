// src/services/document_service.rs

use genpdf::{elements, style, Element};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InvoiceRepository,
    models::invoice::InvoiceDetail,
};

// ---
// Formatação de valores ópticos e monetários
// ---

// Valor dioptrico com sinal explícito e duas casas ("+1.00", "-1.50").
// A normalização de sinal (CYL negativo, ADD positivo) já aconteceu na
// gravação; aqui só imprimimos o que está no banco.
pub fn fmt_diopter(value: Decimal) -> String {
    if value.is_sign_negative() {
        format!("{:.2}", value)
    } else {
        format!("+{:.2}", value)
    }
}

fn fmt_diopter_opt(value: Option<Decimal>) -> String {
    value.map(fmt_diopter).unwrap_or_else(|| "-".to_string())
}

// AXIS e MPD não carregam sinal.
fn fmt_plain_opt(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

pub fn fmt_rupiah(value: Decimal) -> String {
    format!("Rp {:.2}", value)
}

// ---
// O Serviço
// ---

#[derive(Clone)]
pub struct DocumentService {
    pool: PgPool,
    invoice_repo: InvoiceRepository,
    store_name: String,
}

impl DocumentService {
    pub fn new(pool: PgPool, invoice_repo: InvoiceRepository, store_name: String) -> Self {
        Self {
            pool,
            invoice_repo,
            store_name,
        }
    }

    // Devolve o número da fatura junto com os bytes: quem serve o arquivo
    // precisa dele para o nome, e a fatura já foi lida aqui.
    pub async fn generate_invoice_pdf(
        &self,
        invoice_id: Uuid,
    ) -> Result<(String, Vec<u8>), AppError> {
        // 1. Busca os Dados
        let header = self
            .invoice_repo
            .find_by_id(&self.pool, invoice_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Fatura {}", invoice_id)))?;
        let items = self.invoice_repo.list_items(&self.pool, invoice_id).await?;
        let payments = self.invoice_repo.list_payments(&self.pool, invoice_id).await?;

        let detail = InvoiceDetail {
            header,
            items,
            payments,
        };

        // 2. Configura o PDF
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| {
                AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string())
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Fatura {}", detail.header.invoice_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(self.store_name.clone())
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Filial: {}",
            detail.header.branch.display_name()
        )));

        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("FATURA {}", detail.header.invoice_number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Data: {}",
            detail.header.created_at.format("%d/%m/%Y")
        )));

        // --- BLOCO DO CLIENTE ---
        doc.push(elements::Paragraph::new(format!(
            "Cliente: {}",
            detail.header.customer_name
        )));
        doc.push(elements::Paragraph::new(format!(
            "Telefone: {}",
            detail.header.customer_phone
        )));
        if let Some(ref addr) = detail.header.customer_address {
            doc.push(elements::Paragraph::new(format!("Endereço: {}", addr)));
        }

        doc.push(elements::Break::new(2));

        // --- TABELA DE ITENS ---
        // Pesos das colunas: Nome (4), Qtd (1), Preço (2), Desconto (2), Total (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Produto").styled(style_bold))
            .element(elements::Paragraph::new("Qtd").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Desconto").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .expect("Table error");

        for item in &detail.items {
            let line_total = Decimal::from(item.quantity) * item.price - item.discount;
            table
                .row()
                .element(elements::Paragraph::new(item.product_name.clone()))
                .element(elements::Paragraph::new(format!("{}", item.quantity)))
                .element(elements::Paragraph::new(fmt_rupiah(item.price)))
                .element(elements::Paragraph::new(fmt_rupiah(item.discount)))
                .element(elements::Paragraph::new(fmt_rupiah(line_total)))
                .push()
                .expect("Table row error");
        }

        doc.push(table);
        doc.push(elements::Break::new(1.5));

        // --- TABELA DE RECEITA (só quando algum item tem grau) ---
        let lens_items: Vec<_> = detail
            .items
            .iter()
            .filter(|i| i.has_prescription())
            .collect();

        if !lens_items.is_empty() {
            doc.push(
                elements::Paragraph::new("RECEITA")
                    .styled(style::Style::new().bold().with_font_size(12)),
            );

            let mut rx_table = elements::TableLayout::new(vec![3, 1, 1, 1, 1, 1]);
            rx_table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

            rx_table
                .row()
                .element(elements::Paragraph::new("Lente").styled(style_bold))
                .element(elements::Paragraph::new("SPH").styled(style_bold))
                .element(elements::Paragraph::new("CYL").styled(style_bold))
                .element(elements::Paragraph::new("AXIS").styled(style_bold))
                .element(elements::Paragraph::new("ADD").styled(style_bold))
                .element(elements::Paragraph::new("MPD").styled(style_bold))
                .push()
                .expect("Table error");

            for item in lens_items {
                rx_table
                    .row()
                    .element(elements::Paragraph::new(item.product_name.clone()))
                    .element(elements::Paragraph::new(fmt_diopter_opt(item.sph)))
                    .element(elements::Paragraph::new(fmt_diopter_opt(item.cyl)))
                    .element(elements::Paragraph::new(fmt_plain_opt(item.axis)))
                    .element(elements::Paragraph::new(fmt_diopter_opt(item.add_power)))
                    .element(elements::Paragraph::new(fmt_plain_opt(item.mpd)))
                    .push()
                    .expect("Table row error");
            }

            doc.push(rx_table);
            doc.push(elements::Break::new(1.5));
        }

        // --- TOTAIS ---
        let totals = [
            ("Total", detail.header.total_amount),
            ("Desconto", detail.header.discount_amount),
            ("Total Geral", detail.header.grand_total),
            ("Entrada", detail.header.down_payment),
            ("Saldo", detail.header.remaining_balance),
        ];

        for (label, value) in totals {
            let mut p = elements::Paragraph::new(format!("{}: {}", label, fmt_rupiah(value)));
            p.set_alignment(genpdf::Alignment::Right);
            doc.push(p.styled(style::Style::new().with_font_size(11)));
        }

        // 3. Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok((detail.header.invoice_number, buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn diopter_carries_explicit_sign() {
        assert_eq!(fmt_diopter(dec("1.5")), "+1.50");
        assert_eq!(fmt_diopter(dec("-1.5")), "-1.50");
        assert_eq!(fmt_diopter(Decimal::ZERO), "+0.00");
    }

    #[test]
    fn normalized_cyl_prints_negative() {
        // O caminho completo: CYL digitado como 1.50 é gravado como -1.50
        // e impresso como "-1.50".
        let rx = crate::services::invoice_service::Prescription {
            cyl: Some(dec("1.50")),
            ..Default::default()
        };
        assert_eq!(fmt_diopter_opt(rx.normalized().cyl), "-1.50");
    }

    #[test]
    fn normalized_add_prints_positive() {
        let rx = crate::services::invoice_service::Prescription {
            add_power: Some(dec("-0.75")),
            ..Default::default()
        };
        assert_eq!(fmt_diopter_opt(rx.normalized().add_power), "+0.75");
    }

    #[test]
    fn missing_values_print_as_dash() {
        assert_eq!(fmt_diopter_opt(None), "-");
        assert_eq!(fmt_plain_opt(None), "-");
    }

    #[test]
    fn rupiah_two_decimals() {
        assert_eq!(fmt_rupiah(dec("150000")), "Rp 150000.00");
    }
}
