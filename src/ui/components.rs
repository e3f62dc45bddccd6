/// Reusable UI components

use patternfly_yew::prelude::*;
use yew::prelude::*;

use crate::operations::UsageRow;

#[derive(Properties, PartialEq)]
pub struct UsageTableProps {
    pub rows: Vec<UsageRow>,
    /// Receives the domain whose limit should be removed
    pub on_delete: Callback<String>,
}

#[function_component(UsageTable)]
pub fn usage_table(props: &UsageTableProps) -> Html {
    if props.rows.is_empty() {
        return html! {
            <p class="empty-state">{"No usage or limits yet."}</p>
        };
    }

    html! {
        <table class="usage-table">
            <thead>
                <tr>
                    <th>{"Domain"}</th>
                    <th>{"Used"}</th>
                    <th>{"Limit"}</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                {for props.rows.iter().map(|row| html! {
                    <UsageTableRow
                        key={row.domain.clone()}
                        row={row.clone()}
                        on_delete={props.on_delete.clone()}
                    />
                })}
            </tbody>
        </table>
    }
}

#[derive(Properties, PartialEq)]
pub struct UsageTableRowProps {
    pub row: UsageRow,
    pub on_delete: Callback<String>,
}

#[function_component(UsageTableRow)]
pub fn usage_table_row(props: &UsageTableRowProps) -> Html {
    let row = &props.row;

    let on_delete = props.on_delete.reform({
        let domain = row.domain.clone();
        move |_: MouseEvent| domain.clone()
    });

    html! {
        <tr class={if row.active { "usage-row usage-row-active" } else { "usage-row" }}>
            <td>
                {&row.domain}
                if row.active {
                    {"  🔵"}
                }
            </td>
            <td>{row.used_label()}</td>
            <td>{row.limit_label()}</td>
            <td>
                <Button onclick={on_delete} variant={ButtonVariant::Plain}>
                    {"✕"}
                </Button>
            </td>
        </tr>
    }
}
